//! 内容路径工具
//!
//! EPUB内部路径一律使用 `/` 分隔，与宿主操作系统无关。

use percent_encoding::percent_decode_str;

/// 判断路径是否为本地路径（即不是带网络协议的绝对URL）
///
/// 空字符串视为本地路径。
pub fn is_local_path(path: &str) -> bool {
    match path.find("://") {
        Some(index) => {
            let scheme = &path[..index];
            let mut chars = scheme.chars();
            let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            !valid_scheme
        }
        None => true,
    }
}

/// 返回文件路径中最后一个 `/` 之前的部分
///
/// 末尾的 `/` 先被全部去掉，因此 `"Dir/"` 和 `"Dir//"` 都返回 `"Dir"`；没有 `/` 时返回空字符串。
pub fn directory_path(file_path: &str) -> &str {
    let trimmed = file_path.trim_end_matches('/');
    if trimmed.len() != file_path.len() {
        return trimmed;
    }
    match file_path.rfind('/') {
        Some(index) => &file_path[..index],
        None => "",
    }
}

/// 拼接目录和文件名，并折叠文件名开头的 `..`
///
/// # 参数
/// * `directory` - 基准目录，可以为空
/// * `file_name` - 相对文件路径，可以为空
///
/// # 返回值
/// * 两者都为 `None` 时返回 `None`；一方为空时原样返回另一方
pub fn combine(directory: Option<&str>, file_name: Option<&str>) -> Option<String> {
    let directory = directory.filter(|d| !d.is_empty());
    let file_name = file_name.filter(|f| !f.is_empty());
    match (directory, file_name) {
        (None, None) => None,
        (Some(directory), None) => Some(directory.to_string()),
        (None, Some(file_name)) => Some(file_name.to_string()),
        (Some(directory), Some(file_name)) => Some(combine_paths(directory, file_name)),
    }
}

/// [`combine`] 的非空版本，空目录直接返回文件名
pub fn combine_str(directory: &str, file_name: &str) -> String {
    combine(Some(directory), Some(file_name)).unwrap_or_default()
}

fn combine_paths(directory: &str, file_name: &str) -> String {
    let mut segments: Vec<&str> = directory.split('/').filter(|s| !s.is_empty()).collect();
    let mut rest: Vec<&str> = file_name.split('/').filter(|s| !s.is_empty()).collect();

    let parent_count = rest.iter().take_while(|s| **s == "..").count();
    for _ in 0..parent_count {
        segments.pop();
    }
    rest.drain(..parent_count);

    segments.extend(rest);
    segments.join("/")
}

/// 对href做百分号解码，解码失败时保留原值
pub fn unescape(href: &str) -> String {
    percent_decode_str(href)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("Directory/File.html"));
        assert!(is_local_path(""));
        assert!(is_local_path("../File.html#anchor"));
        assert!(!is_local_path("https://example.com/File.html"));
        assert!(!is_local_path("http://example.com"));
    }

    #[test]
    fn test_directory_path() {
        assert_eq!(directory_path("Directory/File.html"), "Directory");
        assert_eq!(directory_path("Directory/Subdirectory/File.html"), "Directory/Subdirectory");
        assert_eq!(directory_path("File.html"), "");
        assert_eq!(directory_path("Directory/"), "Directory");
        assert_eq!(directory_path("Directory//"), "Directory");
        assert_eq!(directory_path("Directory/Subdirectory//"), "Directory/Subdirectory");
        assert_eq!(directory_path(""), "");
        assert_eq!(directory_path("Directory/../File.html"), "Directory/..");
        assert_eq!(directory_path("../File.html"), "..");
    }

    #[test]
    fn test_combine() {
        let cases = [
            (Some("Directory"), Some("File.html"), Some("Directory/File.html")),
            (Some(""), Some("File.html"), Some("File.html")),
            (None, Some("File.html"), Some("File.html")),
            (Some("Directory/Subdirectory"), Some("../File.html"), Some("Directory/File.html")),
            (Some("Directory//Subdirectory"), Some("..//File.html"), Some("Directory/File.html")),
            (Some("Directory///Subdirectory"), Some("..///File.html"), Some("Directory/File.html")),
            (Some("Directory"), Some("../File.html"), Some("File.html")),
            (
                Some("Directory/Subdirectory/Subsubdirectory"),
                Some("../../File.html"),
                Some("Directory/File.html"),
            ),
            (Some("Directory/Subdirectory"), Some("../../File.html"), Some("File.html")),
            (Some("Directory"), Some("../../File.html"), Some("File.html")),
            (Some(""), Some("../File.html"), Some("../File.html")),
            (Some("Directory"), None, Some("Directory")),
            (None, None, None),
        ];
        for (directory, file_name, expected) in cases {
            assert_eq!(
                combine(directory, file_name).as_deref(),
                expected,
                "combine({:?}, {:?})",
                directory,
                file_name
            );
        }
    }

    #[test]
    fn test_combine_nested() {
        let chapter = combine_str("OEBPS", "Text/chapter.html");
        assert_eq!(chapter, "OEBPS/Text/chapter.html");
        assert_eq!(combine_str(directory_path(&chapter), "../Styles/style.css"), "OEBPS/Styles/style.css");
        for file_name in ["a.html", "Text/a.html", "Text/Sub/a.html"] {
            assert!(directory_path(&combine_str("OEBPS", file_name)).starts_with("OEBPS"));
        }
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("chapter%31.html"), "chapter1.html");
        assert_eq!(unescape("My%20Book.html#p%201"), "My Book.html#p 1");
        assert_eq!(unescape("plain.html"), "plain.html");
        assert_eq!(unescape("bad%FF.html"), "bad%FF.html");
    }
}
