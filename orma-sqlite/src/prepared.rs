use crate::{
    CBox, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use anyhow::{Error, Result};
use libsqlite3_sys::*;
use orma_core::{RowLabeled, Value, truncate_long};
use std::{
    ffi::{CStr, c_int},
    os::raw::{c_char, c_void},
    sync::Arc,
};

/// A single compiled statement, finalized on drop.
pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
}

impl SqlitePrepared {
    pub(crate) fn new(statement: CBox<*mut sqlite3_stmt>) -> Self {
        Self { statement }
    }

    /// Text of the statement as it was prepared.
    pub fn sql(&self) -> String {
        unsafe {
            let ptr = sqlite3_sql(*self.statement);
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    fn error(&self, context: String) -> Error {
        let message = unsafe {
            error_message_from_ptr(sqlite3_errmsg(sqlite3_db_handle(*self.statement)))
        };
        let error = Error::msg(message).context(context);
        log::error!("{:#}", error);
        error
    }

    /// Binds `values` to the parameters of the statement, in order.
    pub fn bind_all(&mut self, values: &[Value]) -> Result<&mut Self> {
        let expected = unsafe { sqlite3_bind_parameter_count(*self.statement) } as usize;
        if expected != values.len() {
            let error = Error::msg(format!(
                "The query expects {} parameters but {} were given:\n{}",
                expected,
                values.len(),
                truncate_long(&self.sql())
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        for (i, value) in values.iter().enumerate() {
            self.bind_index(value, i as u64 + 1)?;
        }
        Ok(self)
    }

    /// Binds one value, `index` starts from 1.
    pub fn bind_index(&mut self, value: &Value, index: u64) -> Result<&mut Self> {
        let index = index as c_int;
        let statement = *self.statement;
        let rc = unsafe {
            match value {
                v if v.is_null() => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
                Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
                Value::UInt64(Some(v)) => {
                    let Ok(v) = i64::try_from(*v) else {
                        let error = Error::msg(format!(
                            "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                            v
                        ));
                        log::error!("{:#}", error);
                        return Err(error);
                    };
                    sqlite3_bind_int64(statement, index, v)
                }
                Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Char(Some(v)) => {
                    let v = v.to_string();
                    sqlite3_bind_text(
                        statement,
                        index,
                        v.as_ptr() as *const c_char,
                        v.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                }
                Value::Varchar(Some(v)) => sqlite3_bind_text(
                    statement,
                    index,
                    v.as_ptr() as *const c_char,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                _ => {
                    let error =
                        Error::msg(format!("Cannot use a {:?} as a query parameter", value));
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        };
        if rc != SQLITE_OK {
            return Err(self.error(format!(
                "Cannot bind parameter {} to query:\n{}",
                index,
                truncate_long(&self.sql())
            )));
        }
        Ok(self)
    }

    /// Runs the statement to completion, discarding any row it produces.
    pub(crate) fn run(&mut self) -> Result<()> {
        loop {
            match unsafe { sqlite3_step(*self.statement) } {
                SQLITE_BUSY => continue,
                SQLITE_ROW => continue,
                SQLITE_DONE => return Ok(()),
                _ => {
                    return Err(self.error(format!(
                        "While executing the query:\n{}",
                        truncate_long(&self.sql())
                    )));
                }
            }
        }
    }

    /// Runs the statement to completion, collecting every row.
    pub(crate) fn rows(&mut self) -> Result<Vec<RowLabeled>> {
        let statement = *self.statement;
        let count = unsafe { sqlite3_column_count(statement) };
        let labels = (0..count)
            .map(|i| extract_name(statement, i))
            .collect::<Result<Arc<[_]>>>()?;
        let mut rows = Vec::new();
        loop {
            match unsafe { sqlite3_step(statement) } {
                SQLITE_BUSY => continue,
                SQLITE_DONE => break,
                SQLITE_ROW => rows.push(RowLabeled::new(
                    labels.clone(),
                    (0..count)
                        .map(|i| extract_value(statement, i))
                        .collect::<Result<_>>()?,
                )),
                _ => {
                    return Err(self.error(format!(
                        "While fetching the rows of the query:\n{}",
                        truncate_long(&self.sql())
                    )));
                }
            }
        }
        Ok(rows)
    }
}
