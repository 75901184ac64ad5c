use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Type of an entry in the remote index
///
/// The discriminants are fixed by the host filesystem contract and travel over
/// the wire as plain integers. `SymbolicLink` is a bit flag, not an ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileKind {
    #[default]
    Unknown,
    File,
    Directory,
    SymbolicLink,
}

impl FileKind {
    pub const SYMBOLIC_LINK_FLAG: u32 = 64;

    pub fn as_u32(self) -> u32 {
        match self {
            FileKind::Unknown => 0,
            FileKind::File => 1,
            FileKind::Directory => 2,
            FileKind::SymbolicLink => Self::SYMBOLIC_LINK_FLAG,
        }
    }

    pub fn is_dir(self) -> bool {
        self == FileKind::Directory
    }

    pub fn is_file(self) -> bool {
        self == FileKind::File
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileKind::Unknown => "unknown",
            FileKind::File => "file",
            FileKind::Directory => "directory",
            FileKind::SymbolicLink => "symlink",
        };
        f.write_str(name)
    }
}

impl From<u32> for FileKind {
    /// Decoding never fails: any value carrying the symlink flag is a link
    /// (hosts may send `File | SymbolicLink`), anything else unknown is `Unknown`.
    fn from(value: u32) -> Self {
        match value {
            1 => FileKind::File,
            2 => FileKind::Directory,
            v if v & Self::SYMBOLIC_LINK_FLAG != 0 => FileKind::SymbolicLink,
            _ => FileKind::Unknown,
        }
    }
}

impl From<FileKind> for u32 {
    fn from(kind: FileKind) -> Self {
        kind.as_u32()
    }
}

impl Serialize for FileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.as_u32())
    }
}

impl<'de> Deserialize<'de> for FileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(FileKind::from)
    }
}

/// Metadata for one entry, as returned by `statFile`
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    #[serde(alias = "type")]
    pub kind: FileKind,
    #[serde(alias = "ctime", default)]
    pub created_at: u64,
    #[serde(alias = "mtime", default)]
    pub modified_at: u64,
    #[serde(default)]
    pub size: u64,
}

impl FileStat {
    pub fn new(kind: FileKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_created_at(mut self, millis: u64) -> Self {
        self.created_at = millis;
        self
    }

    pub fn with_modified_at(mut self, millis: u64) -> Self {
        self.modified_at = millis;
        self
    }

    pub fn created(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.created_at)
    }

    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.modified_at)
    }
}

/// One child of a directory listing
///
/// Encoded on the wire as a `[name, kind]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, FileKind)", into = "(String, FileKind)")]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: FileKind,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}

impl From<(String, FileKind)> for DirectoryEntry {
    fn from((name, kind): (String, FileKind)) -> Self {
        Self { name, kind }
    }
}

impl From<DirectoryEntry> for (String, FileKind) {
    fn from(entry: DirectoryEntry) -> Self {
        (entry.name, entry.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_kind_wire_values() {
        assert_eq!(FileKind::Unknown.as_u32(), 0);
        assert_eq!(FileKind::File.as_u32(), 1);
        assert_eq!(FileKind::Directory.as_u32(), 2);
        assert_eq!(FileKind::SymbolicLink.as_u32(), 64);

        assert_eq!(serde_json::to_value(FileKind::SymbolicLink).unwrap(), json!(64));
        let kind: FileKind = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(kind, FileKind::Directory);
    }

    #[test]
    fn test_file_kind_decoding_is_total() {
        assert_eq!(FileKind::from(65), FileKind::SymbolicLink);
        assert_eq!(FileKind::from(66), FileKind::SymbolicLink);
        assert_eq!(FileKind::from(7), FileKind::Unknown);
        assert_eq!(FileKind::from(0), FileKind::Unknown);
    }

    #[test]
    fn test_file_stat_from_wire() {
        let stat: FileStat = serde_json::from_value(json!({
            "kind": 1,
            "size": 42,
            "createdAt": 0,
            "modifiedAt": 1500
        }))
        .unwrap();

        assert_eq!(stat.kind, FileKind::File);
        assert_eq!(stat.size, 42);
        assert_eq!(stat.modified(), UNIX_EPOCH + Duration::from_millis(1500));
    }

    #[test]
    fn test_file_stat_accepts_host_field_names() {
        let stat: FileStat = serde_json::from_value(json!({
            "type": 2,
            "ctime": 10,
            "mtime": 20,
            "size": 0
        }))
        .unwrap();

        assert_eq!(stat, FileStat::new(FileKind::Directory).with_created_at(10).with_modified_at(20));
    }

    #[test]
    fn test_file_stat_serializes_camel_case() {
        let stat = FileStat::new(FileKind::File).with_size(3);
        let value = serde_json::to_value(stat).unwrap();
        assert_eq!(
            value,
            json!({"kind": 1, "createdAt": 0, "modifiedAt": 0, "size": 3})
        );
    }

    #[test]
    fn test_directory_entry_pair_encoding() {
        let entries: Vec<DirectoryEntry> =
            serde_json::from_value(json!([["src", 2], ["a.smf", 1], ["link", 64]])).unwrap();

        assert_eq!(
            entries,
            vec![
                DirectoryEntry::new("src", FileKind::Directory),
                DirectoryEntry::new("a.smf", FileKind::File),
                DirectoryEntry::new("link", FileKind::SymbolicLink),
            ]
        );
        assert!(entries[0].is_dir());
        assert!(entries[1].is_file());
        assert_eq!(serde_json::to_value(&entries[1]).unwrap(), json!(["a.smf", 1]));
    }
}
