use crate::Oid;

/// Wire type tag of a variable binding.
///
/// Carried alongside every value because SET requests must name the type
/// they encode; the character codes mirror the net-snmp command line
/// conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    OctetStr,
    ObjectId,
    IpAddress,
    Counter32,
    Counter64,
    Gauge32,
    TimeTicks,
    Opaque,
    Null,
}

impl ValueType {
    pub fn as_char(&self) -> char {
        match self {
            ValueType::Integer => 'i',
            ValueType::OctetStr => 's',
            ValueType::ObjectId => 'o',
            ValueType::IpAddress => 'a',
            ValueType::Counter32 => 'c',
            ValueType::Counter64 => 'C',
            ValueType::Gauge32 => 'u',
            ValueType::TimeTicks => 't',
            ValueType::Opaque => 'x',
            ValueType::Null => 'n',
        }
    }

    pub fn from_char(code: char) -> Option<ValueType> {
        let value_type = match code {
            'i' => ValueType::Integer,
            's' => ValueType::OctetStr,
            'o' => ValueType::ObjectId,
            'a' => ValueType::IpAddress,
            'c' => ValueType::Counter32,
            'C' => ValueType::Counter64,
            'u' => ValueType::Gauge32,
            't' => ValueType::TimeTicks,
            'x' => ValueType::Opaque,
            'n' => ValueType::Null,
            _ => return None,
        };
        Some(value_type)
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::OctetStr
    }
}

/// One (identifier, type, value) binding as returned by the remote
/// session. Values are kept in their string-rendered form; the session is
/// responsible for formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectValue {
    pub id: Oid,
    pub value_type: ValueType,
    pub data: String,
}

impl ObjectValue {
    pub fn new(id: Oid, value_type: ValueType, data: impl Into<String>) -> Self {
        ObjectValue {
            id,
            value_type,
            data: data.into(),
        }
    }
}
