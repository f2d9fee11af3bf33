//! Object-creation notification types.
//!
//! Only the bucket name and object key of each record are consumed; every
//! other field of the notification is ignored during deserialization.

use fl_error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A notification listing newly created objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Records in delivery order
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

/// A single entry of a [`NotificationEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Event name (e.g. `ObjectCreated:Put`), informational only
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    /// Storage entity the event refers to
    pub s3: S3Entity,
}

/// Bucket and object of a notification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    /// Object key, URL-encoded as delivered by the notification
    pub key: String,

    /// Object size in bytes, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl NotificationEvent {
    /// Builds an event for the given (bucket, raw key) pairs.
    pub fn from_objects<I, B, K>(objects: I) -> Self
    where
        I: IntoIterator<Item = (B, K)>,
        B: Into<String>,
        K: Into<String>,
    {
        let records = objects
            .into_iter()
            .map(|(bucket, key)| NotificationRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.into(),
                    },
                    object: S3Object {
                        key: key.into(),
                        size: None,
                    },
                },
            })
            .collect();

        Self { records }
    }

    /// Returns the decoded location of every record, in order.
    pub fn locations(&self) -> Result<Vec<ObjectLocation>> {
        self.records.iter().map(NotificationRecord::location).collect()
    }
}

impl NotificationRecord {
    /// Returns the decoded location this record refers to.
    pub fn location(&self) -> Result<ObjectLocation> {
        ObjectLocation::from_notification(&self.s3.bucket.name, &self.s3.object.key)
    }
}

/// A decoded (bucket, key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Creates a location from an already decoded key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Creates a location from a notification key.
    ///
    /// Notification keys are form-encoded: `+` stands for a space and other
    /// reserved bytes are percent-escaped.
    pub fn from_notification(bucket: &str, raw_key: &str) -> Result<Self> {
        let plus_decoded = raw_key.replace('+', " ");
        let key = urlencoding::decode(&plus_decoded).map_err(|e| {
            FetchError::InvalidKey(format!("Key '{}' is not valid UTF-8 once decoded: {}", raw_key, e))
        })?;

        Ok(Self::new(bucket, key.into_owned()))
    }

    /// Returns the last path segment of the key, used as the local file name.
    ///
    /// Returns `None` when the key ends with `/` or the segment is `.`/`..`.
    pub fn file_name(&self) -> Option<&str> {
        self.key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
