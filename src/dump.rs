//! 对象表的导出 / 导入
//!
//! 目标位置可以是标准输入输出（`-`），也可以是文件路径；
//! 文件路径若不以 `.json`（不区分大小写）结尾会自动补上。
//!
//! 文件格式为单个 JSON 对象，key 为类型名，value 为存储结构数组：
//! ```json
//! {
//!   "clients": [ { "id": "...", "profileId": "...", "userAgent": "", "lastLaunch": 0 } ],
//!   "profiles": [ ... ]
//! }
//! ```

use crate::error::{AdminError, Result, SerializationError};
use crate::records::{ObjectMap, StoredObjectMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 表示标准输入输出的特殊位置
pub const STDIO_SENTINEL: &str = "-";

const JSON_EXTENSION: &str = ".json";

/// 导出目标 / 导入来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// 标准输入（导入）或标准输出（导出）
    Stdio,
    /// 已规范化的文件路径
    Path(PathBuf),
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        if raw == STDIO_SENTINEL {
            Location::Stdio
        } else {
            Location::Path(normalize_json_path(raw))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Stdio => f.write_str("standard stream"),
            Location::Path(path) => write!(f, "{:?}", path.display().to_string()),
        }
    }
}

/// 路径不以 `.json`（不区分大小写）结尾时补上扩展名
pub fn normalize_json_path(raw: &str) -> PathBuf {
    if raw.to_lowercase().ends_with(JSON_EXTENSION) {
        PathBuf::from(raw)
    } else {
        PathBuf::from(format!("{raw}{JSON_EXTENSION}"))
    }
}

fn io_error(location: &Location, source: std::io::Error) -> SerializationError {
    SerializationError::Io {
        target: location.to_string(),
        source,
    }
}

// ── 导出 ──────────────────────────────────────────────────────────────────────

/// 把对象表（降级后的存储结构）写入 writer
pub fn dump_objects_to_writer(objects: &ObjectMap, writer: impl Write) -> Result<()> {
    write_stored(&objects.to_stored()?, writer)
}

fn write_stored(stored: &StoredObjectMap, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, stored)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// 导出到指定位置，返回实际写入的位置
pub fn dump_objects(objects: &ObjectMap, location: &Location) -> Result<Location> {
    match location {
        Location::Stdio => {
            let stdout = std::io::stdout();
            dump_objects_to_writer(objects, stdout.lock())
                .map_err(|e| with_location(e, location))?;
        }
        Location::Path(path) => {
            // 先完成降级，失败时不截断已有文件
            let stored = objects.to_stored()?;
            let file = File::create(path).map_err(|e| io_error(location, e))?;
            write_stored(&stored, BufWriter::new(file))
                .map_err(|e| with_location(e, location))?;
            info!(path = %path.display(), records = objects.total_records(), "📦 对象已导出");
        }
    }
    Ok(location.clone())
}

/// 导出到原始字符串描述的位置（`-` 或路径）
pub fn dump_objects_to_path(objects: &ObjectMap, raw: &str) -> Result<Location> {
    dump_objects(objects, &Location::parse(raw))
}

// ── 导入 ──────────────────────────────────────────────────────────────────────

/// 从 reader 读取存储表并升级为对象表
pub fn load_objects_from_reader(reader: impl Read) -> Result<ObjectMap> {
    let stored: StoredObjectMap = serde_json::from_reader(reader)?;
    debug!(names = stored.len(), "存储表已解析");
    ObjectMap::from_stored(&stored)
}

/// 从指定位置导入
pub fn load_objects(location: &Location) -> Result<ObjectMap> {
    let objects = match location {
        Location::Stdio => {
            let stdin = std::io::stdin();
            load_objects_from_reader(stdin.lock()).map_err(|e| with_location(e, location))?
        }
        Location::Path(path) => load_objects_from_file(path, location)?,
    };
    info!(source = %location, records = objects.total_records(), "📥 对象已导入");
    Ok(objects)
}

/// 从原始字符串描述的位置（`-` 或路径）导入
pub fn load_objects_from_path(raw: &str) -> Result<ObjectMap> {
    load_objects(&Location::parse(raw))
}

fn load_objects_from_file(path: &Path, location: &Location) -> Result<ObjectMap> {
    let file = File::open(path).map_err(|e| io_error(location, e))?;
    load_objects_from_reader(BufReader::new(file)).map_err(|e| with_location(e, location))
}

/// 裸 IO 错误补上位置信息
fn with_location(err: AdminError, location: &Location) -> AdminError {
    match err {
        AdminError::Io(source) => io_error(location, source).into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::testing::fixtures;

    #[test]
    fn test_location_parse() {
        assert_eq!(Location::parse("-"), Location::Stdio);
        assert_eq!(
            Location::parse("backup"),
            Location::Path(PathBuf::from("backup.json"))
        );
        assert_eq!(
            Location::parse("backup.JSON"),
            Location::Path(PathBuf::from("backup.JSON"))
        );
        assert_eq!(
            Location::parse("dir/backup.json.old"),
            Location::Path(PathBuf::from("dir/backup.json.old.json"))
        );
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("dump").display().to_string();
        let objects = fixtures::object_map(3, 2, 2, 2);

        let written = dump_objects_to_path(&objects, &raw).unwrap();
        assert_eq!(written, Location::Path(dir.path().join("dump.json")));

        let loaded = load_objects_from_path(&raw).unwrap();
        assert_eq!(loaded, objects);
    }

    #[test]
    fn test_round_trip_empty_collections() {
        let objects = fixtures::object_map(0, 0, 0, 0);
        let mut buf = Vec::new();
        dump_objects_to_writer(&objects, &mut buf).unwrap();

        let loaded = load_objects_from_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded, objects);
        assert_eq!(loaded.names().count(), 4);
    }

    #[test]
    fn test_load_fills_missing_keys() {
        let loaded = load_objects_from_reader(r#"{"bogus": [1, 2]}"#.as_bytes()).unwrap();
        let names: Vec<&str> = loaded.names().collect();
        assert_eq!(names, vec!["clients", "conversations", "profiles", "states"]);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_dump_writes_stored_form() {
        let objects = fixtures::object_map(1, 0, 0, 0);
        let mut buf = Vec::new();
        dump_objects_to_writer(&objects, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["profiles"][0]["listenConversationIds"].is_string());
    }

    #[test]
    fn test_load_malformed_json() {
        let err = load_objects_from_reader("{not json".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Serialization(SerializationError::Json(_))
        ));
    }

    #[test]
    fn test_load_bad_record_aborts() {
        let input = r#"{"profiles": [], "clients": [{"id": "x"}]}"#;
        let err = load_objects_from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Conversion(ConversionError::BadShape { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("missing").display().to_string();
        let err = load_objects_from_path(&raw).unwrap_err();
        match err {
            AdminError::Serialization(SerializationError::Io { target, .. }) => {
                assert!(target.contains("missing.json"));
            }
            other => panic!("应该是 IO 错误，实际: {other}"),
        }
    }

    #[test]
    fn test_dump_downgrade_failure() {
        let mut profile = fixtures::profile(1);
        profile.id = "bad".to_string();
        let mut objects = ObjectMap::new();
        objects.push(profile);

        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("bad").display().to_string();
        assert!(matches!(
            dump_objects_to_path(&objects, &raw),
            Err(AdminError::Conversion(_))
        ));
    }

    #[test]
    fn test_failed_dump_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("backup").display().to_string();
        dump_objects_to_path(&fixtures::object_map(2, 0, 0, 0), &raw).unwrap();
        let path = dir.path().join("backup.json");
        let before = std::fs::read_to_string(&path).unwrap();

        let mut profile = fixtures::profile(3);
        profile.id = "bad".to_string();
        let mut objects = ObjectMap::new();
        objects.push(profile);
        assert!(dump_objects_to_path(&objects, &raw).is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(load_objects_from_path(&raw).unwrap().total_records(), 2);
    }
}
