use crate::{EntityDescriptor, Error, FieldDescriptor, Result, Value, separated_by};
use std::fmt::Write;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($out:ident, $value:expr) => {{
        let mut buffer = ryu::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Produces the SQL text of every statement the ORM sends to a store.
///
/// The default methods write the generic dialect. Drivers implement this trait
/// and override only the fragments their store spells differently.
///
/// Nothing here touches a store, every method is pure text construction.
pub trait SqlWriter {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    /// Maps a semantic type to its column type, `None` when the type is unsupported.
    fn column_type(&self, value: &Value) -> Option<&'static str> {
        match value {
            Value::Varchar(..) => Some("VARCHAR(50)"),
            Value::Int32(..) => Some("INTEGER"),
            Value::Int64(..) => Some("BIGINT"),
            _ => None,
        }
    }

    fn write_column_type(
        &self,
        out: &mut String,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Result<()> {
        let Some(column_type) = self.column_type(&field.value) else {
            return Err(Error::UnsupportedType {
                entity: entity.name,
                field: field.field,
                type_name: field.type_name,
            });
        };
        out.push_str(column_type);
        Ok(())
    }

    fn write_identity_column(
        &self,
        out: &mut String,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Result<()> {
        self.write_identifier(out, &field.column);
        out.push(' ');
        self.write_column_type(out, entity, field)?;
        out.push_str(" PRIMARY KEY AUTO_INCREMENT");
        Ok(())
    }

    fn write_column(
        &self,
        out: &mut String,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Result<()> {
        self.write_identifier(out, &field.column);
        out.push(' ');
        self.write_column_type(out, entity, field)
    }

    fn write_drop_table(&self, out: &mut String, entity: &EntityDescriptor) {
        out.push_str("DROP TABLE IF EXISTS ");
        self.write_identifier(out, entity.name);
    }

    /// Identity column first, then the other mapped columns in declaration order.
    fn write_create_table(&self, out: &mut String, entity: &EntityDescriptor) -> Result<()> {
        let identity = entity.identity()?;
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, entity.name);
        out.push_str(" (");
        self.write_identity_column(out, entity, identity)?;
        for field in entity.columns() {
            out.push(',');
            self.write_column(out, entity, field)?;
        }
        out.push(')');
        Ok(())
    }

    /// Drop and create, as one multi statement command.
    ///
    /// On error `out` may hold a partial statement, callers must discard it.
    fn write_prepare_repository(&self, out: &mut String, entity: &EntityDescriptor) -> Result<()> {
        self.write_drop_table(out, entity);
        out.push_str(";\n");
        self.write_create_table(out, entity)?;
        out.push(';');
        Ok(())
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(out, *v),
            Value::Float64(Some(v)) => write_float!(out, *v),
            Value::Char(Some(v)) => {
                let mut buffer = [0; 4];
                self.write_value_string(out, v.encode_utf8(&mut buffer));
            }
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            _ => self.write_value_none(out),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Wraps the text in single quotes. Embedded quotes are NOT escaped: text
    /// coming from untrusted input must go through the bound statements.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        out.push_str(value);
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_parameter(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    /// `values` are the ones returned by [`Entity::field_values`](crate::Entity::field_values).
    fn write_insert(&self, out: &mut String, entity: &EntityDescriptor, values: &[Value]) {
        out.push_str("INSERT INTO ");
        self.write_identifier(out, entity.name);
        out.push_str(" (");
        separated_by(
            out,
            entity.columns(),
            |out, f| self.write_identifier(out, &f.column),
            ",",
        );
        out.push_str(") VALUES (");
        let mut first = true;
        for field in entity.columns() {
            if !first {
                out.push(',');
            }
            first = false;
            self.write_value(out, &values[field.index]);
        }
        out.push(')');
    }

    fn write_update(
        &self,
        out: &mut String,
        entity: &EntityDescriptor,
        values: &[Value],
    ) -> Result<()> {
        let identity = entity.identity()?;
        out.push_str("UPDATE ");
        self.write_identifier(out, entity.name);
        out.push_str(" SET ");
        let mut first = true;
        for field in entity.columns() {
            if !first {
                out.push(',');
            }
            first = false;
            self.write_identifier(out, &field.column);
            out.push('=');
            self.write_value(out, &values[field.index]);
        }
        out.push_str(" WHERE ");
        self.write_identifier(out, &identity.column);
        out.push_str(" = ");
        self.write_value(out, &values[identity.index]);
        Ok(())
    }

    fn write_select_all(&self, out: &mut String, entity: &EntityDescriptor) {
        out.push_str("SELECT * FROM ");
        self.write_identifier(out, entity.name);
    }

    /// Same shape as [`SqlWriter::write_insert`] with a parameter per column.
    fn write_insert_bound(&self, out: &mut String, entity: &EntityDescriptor) {
        out.push_str("INSERT INTO ");
        self.write_identifier(out, entity.name);
        out.push_str(" (");
        separated_by(
            out,
            entity.columns(),
            |out, f| self.write_identifier(out, &f.column),
            ",",
        );
        out.push_str(") VALUES (");
        separated_by(
            out,
            entity.columns().enumerate(),
            |out, (i, _)| self.write_parameter(out, i + 1),
            ",",
        );
        out.push(')');
    }

    /// Parameters are the columns in declaration order, then the identity.
    fn write_update_bound(&self, out: &mut String, entity: &EntityDescriptor) -> Result<()> {
        let identity = entity.identity()?;
        out.push_str("UPDATE ");
        self.write_identifier(out, entity.name);
        out.push_str(" SET ");
        let mut count = 0;
        separated_by(
            out,
            entity.columns(),
            |out, f| {
                count += 1;
                self.write_identifier(out, &f.column);
                out.push('=');
                self.write_parameter(out, count);
            },
            ",",
        );
        out.push_str(" WHERE ");
        self.write_identifier(out, &identity.column);
        out.push_str(" = ");
        self.write_parameter(out, count + 1);
        Ok(())
    }
}

/// Writer producing the generic dialect, it overrides nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
