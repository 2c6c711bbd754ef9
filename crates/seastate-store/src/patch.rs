// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON patch: the `add`, `replace` and `remove` operations of RFC 6902.
//!
//! A patch applies to a copy of the document and either every operation
//! succeeds or the caller gets an error and no document. The top-level `id`
//! and the document root are immutable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PatchError;

/// Patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert into an object or array, overwriting an existing member.
    Add,
    /// Overwrite an existing location.
    Replace,
    /// Delete an existing location.
    Remove,
}

impl PatchOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

/// One patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation kind.
    pub op: PatchOp,
    /// JSON pointer to the target location.
    pub path: String,
    /// New value; an explicit `null` is a value.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Split `path` into the pointer of its parent and its final unescaped token.
fn split(path: &str) -> Result<(&str, String), PatchError> {
    if path.is_empty() {
        return Err(PatchError::ImmutableField(String::new()));
    }
    if !path.starts_with('/') {
        return Err(PatchError::InvalidPointer(path.to_owned()));
    }
    let (parent, last) = path
        .rsplit_once('/')
        .ok_or_else(|| PatchError::InvalidPointer(path.to_owned()))?;
    if parent.is_empty() && unescape(last) == "id" {
        return Err(PatchError::ImmutableField(path.to_owned()));
    }
    Ok((parent, unescape(last)))
}

fn array_index(token: &str, path: &str) -> Result<usize, PatchError> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !canonical {
        return Err(PatchError::InvalidIndex(path.to_owned()));
    }
    token
        .parse()
        .map_err(|_| PatchError::InvalidIndex(path.to_owned()))
}

fn apply_one(document: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    let path = operation.path.as_str();
    let (parent, token) = split(path)?;
    let target = document
        .pointer_mut(parent)
        .ok_or_else(|| PatchError::PathNotFound(path.to_owned()))?;
    let value = || {
        operation.value.clone().ok_or_else(|| PatchError::MissingValue {
            op: operation.op.as_str(),
            path: path.to_owned(),
        })
    };
    match (operation.op, target) {
        (PatchOp::Add, Value::Object(map)) => {
            map.insert(token, value()?);
        }
        (PatchOp::Add, Value::Array(items)) => {
            let value = value()?;
            if token == "-" {
                items.push(value);
            } else {
                let idx = array_index(&token, path)?;
                if idx > items.len() {
                    return Err(PatchError::InvalidIndex(path.to_owned()));
                }
                items.insert(idx, value);
            }
        }
        (PatchOp::Replace, Value::Object(map)) => {
            let value = value()?;
            let slot = map
                .get_mut(&token)
                .ok_or_else(|| PatchError::PathNotFound(path.to_owned()))?;
            *slot = value;
        }
        (PatchOp::Replace, Value::Array(items)) => {
            let value = value()?;
            let idx = array_index(&token, path)?;
            let slot = items
                .get_mut(idx)
                .ok_or_else(|| PatchError::InvalidIndex(path.to_owned()))?;
            *slot = value;
        }
        (PatchOp::Remove, Value::Object(map)) => {
            map.remove(&token)
                .ok_or_else(|| PatchError::PathNotFound(path.to_owned()))?;
        }
        (PatchOp::Remove, Value::Array(items)) => {
            let idx = array_index(&token, path)?;
            if idx >= items.len() {
                return Err(PatchError::InvalidIndex(path.to_owned()));
            }
            items.remove(idx);
        }
        _ => return Err(PatchError::PathNotFound(path.to_owned())),
    }
    Ok(())
}

/// Apply `operations` in order to a copy of `document`.
pub fn apply_patch(document: &Value, operations: &[PatchOperation]) -> Result<Value, PatchError> {
    let mut out = document.clone();
    for operation in operations {
        apply_one(&mut out, operation)?;
    }
    Ok(out)
}
