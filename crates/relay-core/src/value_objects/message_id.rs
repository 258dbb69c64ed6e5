//! Message ID - store-assigned, time-ordered 64-bit identifier
//!
//! Layout:
//! - Bits 63-22: Timestamp (milliseconds since custom epoch)
//! - Bits 21-12: Worker ID (0-1023)
//! - Bits 11-0:  Sequence number (0-4095)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_SHIFT: u32 = WORKER_BITS + SEQUENCE_BITS;

/// Identifier assigned to a message when the store creates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MessageId(i64);

impl MessageId {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which the id was issued
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> TIMESTAMP_SHIFT) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & 0x3FF) as u16
    }

    pub fn parse(s: &str) -> Result<Self, MessageIdParseError> {
        s.parse::<i64>()
            .map(MessageId)
            .map_err(|_| MessageIdParseError::InvalidFormat)
    }
}

/// Error when parsing a `MessageId` from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageIdParseError {
    #[error("invalid message id format")]
    InvalidFormat,
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for i64 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl std::str::FromStr for MessageId {
    type Err = MessageIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageId::parse(s)
    }
}

// Serialized as a string so JavaScript clients do not lose precision
impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct MessageIdVisitor;

        impl Visitor<'_> for MessageIdVisitor {
            type Value = MessageId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer message id")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<MessageId, E> {
                Ok(MessageId(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<MessageId, E> {
                i64::try_from(value)
                    .map(MessageId)
                    .map_err(|_| E::custom("message id out of range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<MessageId, E> {
                MessageId::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MessageIdVisitor)
    }
}

/// Lock-free generator of unique, monotonically increasing message ids
///
/// The last issued id is kept in a single atomic. When the clock has not
/// advanced (or went backwards) the next id continues from the last one, so
/// ids never repeat and never decrease.
pub struct MessageIdGenerator {
    worker_bits: i64,
    last: AtomicI64,
}

impl MessageIdGenerator {
    /// # Panics
    /// Panics if `worker_id >= 1024`
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id < 1024, "Worker ID must be < 1024");
        Self {
            worker_bits: i64::from(worker_id) << SEQUENCE_BITS,
            last: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> MessageId {
        let fresh = ((current_millis() - MessageId::EPOCH) << TIMESTAMP_SHIFT) | self.worker_bits;

        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = if fresh > last {
                fresh
            } else if last & SEQUENCE_MASK == SEQUENCE_MASK {
                // Sequence exhausted for this millisecond; borrow the next one
                (((last >> TIMESTAMP_SHIFT) + 1) << TIMESTAMP_SHIFT) | self.worker_bits
            } else {
                last + 1
            };

            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return MessageId(next),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        (self.worker_bits >> SEQUENCE_BITS) as u16
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parse_and_display() {
        let id = MessageId::parse("123456789").unwrap();
        assert_eq!(id.into_inner(), 123_456_789);
        assert_eq!(id.to_string(), "123456789");
        assert!(MessageId::parse("abc").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = MessageId::new(123_456_789_012_345_678);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"123456789012345678\"");
    }

    #[test]
    fn test_deserializes_string_or_number() {
        let from_str: MessageId = serde_json::from_str("\"42\"").unwrap();
        let from_num: MessageId = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_generator_ids_are_unique_and_increasing() {
        let gen = MessageIdGenerator::new(3);
        let mut last = MessageId::default();

        for _ in 0..10_000 {
            let id = gen.generate();
            assert!(id > last);
            assert_eq!(id.worker_id(), 3);
            last = id;
        }
    }

    #[test]
    fn test_generator_thread_safety() {
        let gen = Arc::new(MessageIdGenerator::new(1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                thread::spawn(move || (0..2_000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.extend(handle.join().unwrap());
        }
        assert_eq!(ids.len(), 8_000);
    }

    #[test]
    fn test_timestamp_extraction() {
        let before = current_millis();
        let id = MessageIdGenerator::new(0).generate();
        let after = current_millis();

        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }

    #[test]
    #[should_panic(expected = "Worker ID must be < 1024")]
    fn test_generator_invalid_worker_id() {
        MessageIdGenerator::new(1024);
    }
}
