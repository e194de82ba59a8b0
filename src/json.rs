// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Tolerant field access for loosely shaped upstream payloads.
///
/// Missing keys and type mismatches both yield `None`; nothing here fails.
use serde_json::Value;

/// Extension for reading nested values through dotted paths like
/// `"commit.author.name"`.
pub trait JsonPath
{
    /// Resolves `path` or returns `None` when any segment is missing.
    fn at(&self, path: &str,) -> Option<&Value,>;

    /// String at `path`, `None` when absent or not a string.
    fn str_at(&self, path: &str,) -> Option<String,>
    {
        self.at(path,).and_then(Value::as_str,).map(str::to_owned,)
    }

    /// Unsigned integer at `path`, `None` when absent or not a non-negative
    /// integer.
    fn u64_at(&self, path: &str,) -> Option<u64,>
    {
        self.at(path,).and_then(Value::as_u64,)
    }

    /// Signed integer at `path`, `None` when absent or not an integer.
    fn i64_at(&self, path: &str,) -> Option<i64,>
    {
        self.at(path,).and_then(Value::as_i64,)
    }

    /// Whether the value at `path` is present and truthy (not `null`,
    /// `false`, `0`, an empty string, array or object).
    fn truthy_at(&self, path: &str,) -> bool
    {
        match self.at(path,) {
            None | Some(Value::Null,) => false,
            Some(Value::Bool(flag,),) => *flag,
            Some(Value::Number(number,),) => number.as_f64().is_some_and(|n| n != 0.0,),
            Some(Value::String(text,),) => !text.is_empty(),
            Some(Value::Array(items,),) => !items.is_empty(),
            Some(Value::Object(map,),) => !map.is_empty(),
        }
    }
}

impl JsonPath for Value
{
    fn at(&self, path: &str,) -> Option<&Value,>
    {
        if path.is_empty() {
            return Some(self,);
        }

        let mut current = self;
        for key in path.split('.',) {
            current = current.get(key,)?;
        }
        Some(current,)
    }
}
