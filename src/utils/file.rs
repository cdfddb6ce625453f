use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use regex::RegexSet;

pub fn is_file_valid(path: &Path, include_set: &RegexSet, exclude_set: &RegexSet) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    let file_name = file_name.to_string_lossy();
    include_set.is_match(&file_name) && !exclude_set.is_match(&file_name)
}

/// 列出目錄下（不遞迴）符合模式的檔案，依檔名排序
pub fn collect_files(
    input_dir: &Path,
    include_set: &RegexSet,
    exclude_set: &RegexSet,
) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && is_file_valid(&path, include_set, exclude_set) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
