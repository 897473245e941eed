use crate::{CBox, SqliteDriver, SqlitePrepared, error_message_from_ptr};
use anyhow::{Context, Error, Result};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, sqlite3,
    sqlite3_changes, sqlite3_close, sqlite3_errmsg, sqlite3_errstr, sqlite3_last_insert_rowid,
    sqlite3_open_v2, sqlite3_prepare_v2,
};
use orma_core::{Connection, Driver, Executor, RowLabeled, Value, truncate_long};
use std::{
    ffi::{CStr, CString, c_char},
    mem, ptr,
};

/// Connection to a sqlite database.
///
/// Urls have the form `sqlite://<path>[?<uri parameters>]`, for example
/// `sqlite://:memory:` or `sqlite://target/data.sqlite?mode=rwc`. The database
/// file is created when missing unless the parameters say otherwise.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    fn handle(&self) -> Result<*mut sqlite3> {
        if self.connection.is_null() {
            let error = Error::msg("The sqlite connection is closed");
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(*self.connection)
    }

    fn error(&self, context: String) -> Error {
        let message = unsafe { error_message_from_ptr(sqlite3_errmsg(*self.connection)) };
        let error = Error::msg(message).context(context);
        log::error!("{:#}", error);
        error
    }

    /// Compiles the first statement of `sql`, returns it with the byte offset of the remaining text.
    ///
    /// The statement is `None` when `sql` contains only whitespace or comments.
    fn prepare_first(&mut self, sql: &CStr) -> Result<(Option<SqlitePrepared>, usize)> {
        let connection = self.handle()?;
        let mut statement = CBox::statement();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            sqlite3_prepare_v2(
                connection,
                sql.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(self.error(format!(
                "While preparing the query:\n{}",
                truncate_long(&sql.to_string_lossy())
            )));
        }
        let consumed = if tail.is_null() {
            sql.to_bytes().len()
        } else {
            tail as usize - sql.as_ptr() as usize
        };
        let prepared = (!statement.is_null()).then(|| SqlitePrepared::new(statement));
        Ok((prepared, consumed))
    }

    /// Compiles `sql`, that must contain exactly one statement.
    pub fn prepare(&mut self, sql: &str) -> Result<SqlitePrepared> {
        let context = || format!("While preparing the query:\n{}", truncate_long(sql));
        let query = CString::new(sql).with_context(context)?;
        let (prepared, consumed) = self.prepare_first(&query)?;
        let Some(prepared) = prepared else {
            let error = Error::msg("The query does not contain any statement").context(context());
            log::error!("{:#}", error);
            return Err(error);
        };
        if !sql[consumed..].trim().is_empty() && sql[consumed..].trim() != ";" {
            let error =
                Error::msg("Cannot prepare more than one statement at a time").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(prepared)
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &SqliteDriver {
        &SqliteDriver {}
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        let query = CString::new(sql)
            .with_context(|| format!("While executing the query:\n{}", truncate_long(sql)))?;
        let mut rest: &CStr = &query;
        while !rest.is_empty() {
            let (prepared, consumed) = self.prepare_first(rest)?;
            if let Some(mut prepared) = prepared {
                prepared.run()?;
            }
            if consumed == 0 {
                break;
            }
            rest = CStr::from_bytes_with_nul(&rest.to_bytes_with_nul()[consumed..])?;
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut prepared = self.prepare(sql)?;
        prepared.bind_all(params)?.run()?;
        let changes = unsafe { sqlite3_changes(self.handle()?) };
        Ok(changes as u64)
    }

    fn insert(&mut self, sql: &str, params: &[Value]) -> Result<Option<i64>> {
        if self.execute(sql, params)? == 0 {
            return Ok(None);
        }
        Ok(Some(unsafe { sqlite3_last_insert_rowid(self.handle()?) }))
    }

    fn fetch(&mut self, sql: &str) -> Result<Vec<RowLabeled>> {
        self.prepare(sql)?.rows()
    }
}

impl Connection for SqliteConnection {
    fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        let Some(path) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{}`", url);
        let path = CString::new(format!("file:{}", path)).with_context(context)?;
        let mut connection = CBox::connection();
        let rc = unsafe {
            sqlite3_open_v2(
                path.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let message = if connection.is_null() {
                unsafe { error_message_from_ptr(sqlite3_errstr(rc)) }
            } else {
                unsafe { error_message_from_ptr(sqlite3_errmsg(*connection)) }
            };
            let error = Error::msg(message).context(format!("Could not open `{}`", url));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Self { connection })
    }

    fn close(&mut self) -> Result<()> {
        let connection = mem::replace(&mut *self.connection, ptr::null_mut());
        if connection.is_null() {
            return Ok(());
        }
        let rc = unsafe { sqlite3_close(connection) };
        if rc != SQLITE_OK {
            let error = Error::msg(unsafe { error_message_from_ptr(sqlite3_errstr(rc)) })
                .context("While closing the sqlite connection");
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.connection.is_null()
    }
}
