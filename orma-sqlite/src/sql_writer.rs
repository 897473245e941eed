use orma_core::{EntityDescriptor, Error, FieldDescriptor, Result, SqlWriter};

/// Sqlite dialect.
///
/// A key is generated by the store only when the column is an alias of the
/// rowid, and that requires the exact `INTEGER PRIMARY KEY` spelling. The
/// 64 bit width of the identity is kept because sqlite integers are 64 bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn write_identity_column(
        &self,
        out: &mut String,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Result<()> {
        if self.column_type(&field.value).is_none() {
            return Err(Error::UnsupportedType {
                entity: entity.name,
                field: field.field,
                type_name: field.type_name,
            });
        }
        self.write_identifier(out, &field.column);
        out.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
        Ok(())
    }
}
