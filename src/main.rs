use std::path::PathBuf;

use clap::Parser;
use epubforge::{Epub, ReaderOptions, ReaderOptionsPreset, Result, format_navigation_tree};
use tracing_subscriber::EnvFilter;

/// 📚 EpubForge - EPUB结构与导航查看工具
#[derive(Parser)]
#[command(name = "epubforge")]
#[command(about = "读取EPUB文件的结构并打印导航树")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要读取的EPUB文件路径", required_unless_present = "generate_config")]
    epub_file: Option<PathBuf>,

    /// 读取选项预设
    #[arg(long, value_enum, default_value = "strict", help = "校验规则的宽松程度")]
    preset: Preset,

    /// YAML选项文件
    #[arg(long, help = "从YAML文件加载读取选项（优先于 --preset）")]
    config: Option<PathBuf>,

    /// 生成选项文件
    #[arg(long, value_name = "FILE", help = "按 --preset 生成YAML选项文件后退出")]
    generate_config: Option<PathBuf>,

    /// 显示阅读顺序
    #[arg(short, long, help = "同时打印spine中的阅读顺序")]
    reading_order: bool,

    /// 详细输出模式
    #[arg(short, long, help = "输出调试日志")]
    verbose: bool,
}

/// 命令行中的预设名称
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Preset {
    /// 任何不一致都报错
    Strict,
    /// 容忍常见的小问题
    Relaxed,
    /// 忽略所有可忽略的错误
    IgnoreAll,
}

impl From<Preset> for ReaderOptionsPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Strict => ReaderOptionsPreset::Strict,
            Preset::Relaxed => ReaderOptionsPreset::Relaxed,
            Preset::IgnoreAll => ReaderOptionsPreset::IgnoreAllErrors,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ 错误: {}", e);
        std::process::exit(1);
    }
}

/// 安装日志订阅者，`RUST_LOG` 优先
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(args: &Args) -> Result<()> {
    if let Some(path) = &args.generate_config {
        ReaderOptions::generate_config(path, args.preset.into())?;
        println!("✅ 已生成选项文件: {}", path.display());
        return Ok(());
    }

    let options = match &args.config {
        Some(path) => ReaderOptions::from_yaml_file(path)?,
        None => ReaderOptions::from_preset(args.preset.into()),
    };

    // clap保证未生成配置时必有文件参数
    let Some(path) = &args.epub_file else {
        return Ok(());
    };

    let Some(epub) = Epub::open(path, options)? else {
        println!("⚠️ 文件中没有可读取的OPF包");
        return Ok(());
    };

    println!("📚 {}", epub.title().unwrap_or("<无标题>"));
    let authors = epub.authors();
    if !authors.is_empty() {
        println!("✍️ {}", authors.join(", "));
    }
    println!("📦 EPUB版本: {}", epub.schema().package.epub_version);

    match epub.navigation()? {
        Some(items) if !items.is_empty() => {
            println!("\n🌳 目录:");
            print!("{}", format_navigation_tree(&items));
        }
        _ => println!("\n🌳 目录: <无>"),
    }

    if args.reading_order {
        println!("\n📖 阅读顺序:");
        for (i, file) in epub.reading_order()?.iter().enumerate() {
            println!("  {}. {}", i + 1, file.file_path());
        }
    }

    Ok(())
}
