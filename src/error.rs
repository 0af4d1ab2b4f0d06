use std::fmt;

/// whisper-admin 的统一错误类型
#[derive(Debug)]
pub enum AdminError {
    /// 记录 Downgrade / Upgrade 失败
    Conversion(ConversionError),
    /// 存储后端写入失败
    Persistence(PersistenceError),
    /// 未知的类型名（保存时可跳过）
    UnknownType(String),
    /// 配置加载或校验失败
    Config(ConfigError),
    /// 配置栈只剩基础配置，无法再弹出
    StackUnderflow,
    /// dump / load 时的编解码或 IO 错误
    Serialization(SerializationError),
    /// IO 错误
    Io(std::io::Error),
}

/// 记录转换错误
#[derive(Debug)]
pub enum ConversionError {
    /// 类型名下放了别的类型的记录
    WrongKind { expected: String, found: String },
    /// 字段值非法
    InvalidField {
        kind: String,
        field: String,
        message: String,
    },
    /// 存储结构与期望的形状不符
    BadShape { kind: String, message: String },
}

/// 持久化错误
#[derive(Debug)]
pub enum PersistenceError {
    /// 后端写入失败
    WriteFailed { key: String, message: String },
    /// 字段无法展开为存储格式
    Encoding { key: String, message: String },
    /// 执行上下文已取消
    Cancelled,
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 缺少必需的配置项
    MissingField(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

/// 序列化网关错误
#[derive(Debug)]
pub enum SerializationError {
    /// 读写目标失败
    Io { target: String, source: std::io::Error },
    /// JSON 编解码失败
    Json(String),
}

// 实现 Display trait
impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::Conversion(e) => write!(f, "Conversion Error: {}", e),
            AdminError::Persistence(e) => write!(f, "Persistence Error: {}", e),
            AdminError::UnknownType(name) => write!(f, "Unknown object type: {}", name),
            AdminError::Config(e) => write!(f, "Config Error: {}", e),
            AdminError::StackUnderflow => {
                write!(f, "Config Error: cannot pop the base configuration")
            }
            AdminError::Serialization(e) => write!(f, "Serialization Error: {}", e),
            AdminError::Io(e) => write!(f, "IO Error: {}", e),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::WrongKind { expected, found } => {
                write!(f, "expected a {} record, found a {} record", expected, found)
            }
            ConversionError::InvalidField {
                kind,
                field,
                message,
            } => write!(f, "invalid {} field '{}': {}", kind, field, message),
            ConversionError::BadShape { kind, message } => {
                write!(f, "stored {} does not match expected shape: {}", kind, message)
            }
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::WriteFailed { key, message } => {
                write!(f, "failed to save '{}': {}", key, message)
            }
            PersistenceError::Encoding { key, message } => {
                write!(f, "failed to encode fields of '{}': {}", key, message)
            }
            PersistenceError::Cancelled => write!(f, "save cancelled"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::MissingField(field) => write!(f, "Missing config field: {}", field),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::Io { target, source } => {
                write!(f, "I/O failure on {}: {}", target, source)
            }
            SerializationError::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

// 实现 std::error::Error trait
impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdminError::Io(e) => Some(e),
            AdminError::Serialization(SerializationError::Io { source, .. }) => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for ConversionError {}
impl std::error::Error for PersistenceError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for SerializationError {}

impl AdminError {
    /// 是否为可跳过的非致命错误
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AdminError::UnknownType(_))
    }
}

// From 转换实现
impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        AdminError::Io(err)
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Serialization(SerializationError::Json(err.to_string()))
    }
}

impl From<dotenv::Error> for AdminError {
    fn from(err: dotenv::Error) -> Self {
        match err {
            dotenv::Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                AdminError::Config(ConfigError::FileNotFound(e.to_string()))
            }
            other => AdminError::Config(ConfigError::ParseFailed(other.to_string())),
        }
    }
}

impl From<ConversionError> for AdminError {
    fn from(err: ConversionError) -> Self {
        AdminError::Conversion(err)
    }
}

impl From<PersistenceError> for AdminError {
    fn from(err: PersistenceError) -> Self {
        AdminError::Persistence(err)
    }
}

impl From<ConfigError> for AdminError {
    fn from(err: ConfigError) -> Self {
        AdminError::Config(err)
    }
}

impl From<SerializationError> for AdminError {
    fn from(err: SerializationError) -> Self {
        AdminError::Serialization(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
