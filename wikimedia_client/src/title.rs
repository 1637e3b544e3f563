//! 页面标题工具

/// 文件命名空间前缀
pub const FILE_NAMESPACE: &str = "File:";

/// 单次 imageinfo 查询允许的最大标题数
pub const MAX_TITLES_PER_QUERY: usize = 30;

/// 标题比较用的规范形式：下划线视为空格，去掉首尾空白
///
/// # Example
/// ```
/// use wikimedia_client::title::normalize_title;
///
/// assert_eq!(normalize_title("File:Mona_Lisa.jpg"), "File:Mona Lisa.jpg");
/// ```
pub fn normalize_title(title: &str) -> String {
    title.replace('_', " ").trim().to_string()
}

/// 将文件名转换为带 `File:` 前缀的规范标题
pub fn file_title(name: &str) -> String {
    let name = normalize_title(name);
    let has_prefix = name
        .get(..FILE_NAMESPACE.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FILE_NAMESPACE));

    if has_prefix {
        format!("{}{}", FILE_NAMESPACE, name[FILE_NAMESPACE.len()..].trim_start())
    } else {
        format!("{}{}", FILE_NAMESPACE, name)
    }
}

/// 拼接 `titles` 参数，URL 编码由请求构建时统一完成 (`?` → `%3F`)
pub fn join_titles<T: AsRef<str>>(titles: &[T]) -> String {
    titles
        .iter()
        .map(|title| title.as_ref())
        .collect::<Vec<_>>()
        .join("|")
}

/// 按 [`MAX_TITLES_PER_QUERY`] 分批，保持原有顺序
pub fn batches<T>(titles: &[T]) -> std::slice::Chunks<'_, T> {
    titles.chunks(MAX_TITLES_PER_QUERY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Mona_Lisa"), "Mona Lisa");
        assert_eq!(normalize_title("  File:A_b.jpg "), "File:A b.jpg");
    }

    #[test]
    fn test_file_title_adds_prefix() {
        assert_eq!(file_title("Starry_Night.jpg"), "File:Starry Night.jpg");
        assert_eq!(file_title("File:Starry_Night.jpg"), "File:Starry Night.jpg");
        assert_eq!(file_title("file:Starry Night.jpg"), "File:Starry Night.jpg");
    }

    #[test]
    fn test_file_title_multibyte() {
        assert_eq!(file_title("北斎.jpg"), "File:北斎.jpg");
    }

    #[test]
    fn test_join_titles() {
        let titles = vec!["File:A.jpg", "File:What?_(painting).jpg"];
        assert_eq!(join_titles(&titles), "File:A.jpg|File:What?_(painting).jpg");
    }

    #[test]
    fn test_batches_cover_every_title_in_order() {
        for count in [0usize, 1, 29, 30, 31, 60, 95] {
            let titles: Vec<String> = (0..count).map(|i| format!("File:{}.jpg", i)).collect();
            let chunks: Vec<&[String]> = batches(&titles).collect();

            assert_eq!(chunks.len(), count.div_ceil(MAX_TITLES_PER_QUERY));
            assert!(chunks.iter().all(|c| c.len() <= MAX_TITLES_PER_QUERY));

            let flattened: Vec<String> = chunks.concat();
            assert_eq!(flattened, titles);
        }
    }
}
