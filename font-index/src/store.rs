//! The SQLite database shared by the scan and generate steps.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Transaction};

use crate::Error;

const SCHEMA: &str = "
    create table font (
        path text primary key,
        size integer
    );
    create table name (
        path text references font(path),
        i integer,
        platform_id integer,
        encoding_id integer,
        name_id integer,
        name blob
    );
    create table error (
        path text references font(path)
    );";

// rowid order is insertion order, which keeps font numbering stable
const NAME_ROWS: &str = "
    select
        name.path, platform_id,
        encoding_id, name_id, name, size
    from name
    left join font
    on name.path = font.path
    order by name.rowid";

/// One raw name record, joined with the size of the file it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRow {
    pub path: String,
    pub platform_id: u16,
    pub encoding_id: u16,
    pub name_id: u16,
    pub raw: Vec<u8>,
    pub size: u64,
}

/// A raw name record as extracted from a font, before it is stored.
#[derive(Clone, Copy, Debug)]
pub struct RawName<'a> {
    /// The index of the font within a collection, or 0.
    pub font_index: u32,
    pub platform_id: u16,
    pub encoding_id: u16,
    pub name_id: u16,
    pub bytes: &'a [u8],
}

/// A handle to the font database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Create the database at `path` and set up its tables.
    ///
    /// This fails if the tables already exist.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an existing database for reading.
    ///
    /// A missing database is an error; it is never created.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Self {
            conn: Connection::open_with_flags(path, flags)?,
        })
    }

    /// An empty database that lives only as long as the returned value.
    pub fn in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Start a batch of writes; nothing is visible until [`Writer::commit`].
    pub fn writer(&mut self) -> Result<Writer<'_>, Error> {
        Ok(Writer {
            tx: self.conn.transaction()?,
        })
    }

    /// Call `f` with every stored name record, in insertion order.
    ///
    /// Iteration stops at the first error, which is returned.
    pub fn for_each_name_row(
        &self,
        mut f: impl FnMut(NameRow) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut stmt = self.conn.prepare(NAME_ROWS)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            f(NameRow {
                path: row.get(0)?,
                platform_id: row.get(1)?,
                encoding_id: row.get(2)?,
                name_id: row.get(3)?,
                raw: row.get(4)?,
                size: row.get(5)?,
            })?;
        }
        Ok(())
    }

    /// Paths of files that could not be parsed as fonts.
    pub fn error_paths(&self) -> Result<Vec<String>, Error> {
        let mut stmt = self.conn.prepare("select path from error order by rowid")?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths)
    }
}

/// Inserts rows within a single transaction.
pub struct Writer<'a> {
    tx: Transaction<'a>,
}

impl Writer<'_> {
    pub fn insert_font(&self, path: &str, size: u64) -> Result<(), Error> {
        self.tx.execute(
            "insert into font (path, size) values (?1, ?2)",
            (path, size),
        )?;
        Ok(())
    }

    pub fn insert_name(&self, path: &str, name: &RawName) -> Result<(), Error> {
        self.tx.execute(
            "insert into name (path, i, platform_id, encoding_id, name_id, name)
            values (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                path,
                name.font_index,
                name.platform_id,
                name.encoding_id,
                name.name_id,
                name.bytes,
            ),
        )?;
        Ok(())
    }

    pub fn insert_error(&self, path: &str) -> Result<(), Error> {
        self.tx
            .execute("insert into error (path) values (?1)", (path,))?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), Error> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(name_id: u16, bytes: &[u8]) -> RawName<'_> {
        RawName {
            font_index: 0,
            platform_id: 3,
            encoding_id: 1,
            name_id,
            bytes,
        }
    }

    fn all_rows(store: &Store) -> Vec<NameRow> {
        let mut rows = Vec::new();
        store
            .for_each_name_row(|row| {
                rows.push(row);
                Ok(())
            })
            .unwrap();
        rows
    }

    #[test]
    fn rows_are_joined_in_insertion_order() {
        let mut store = Store::in_memory().unwrap();
        let writer = store.writer().unwrap();
        writer.insert_font("b.ttf", 20).unwrap();
        writer.insert_font("a.ttf", 10).unwrap();
        writer.insert_name("b.ttf", &raw(4, &[0, 0x42])).unwrap();
        writer.insert_name("a.ttf", &raw(6, &[0, 0x41])).unwrap();
        writer.insert_name("b.ttf", &raw(6, &[0, 0x43])).unwrap();
        writer.commit().unwrap();

        let rows = all_rows(&store);
        let summary = rows
            .iter()
            .map(|r| (r.path.as_str(), r.name_id, r.raw.as_slice(), r.size))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                ("b.ttf", 4, &[0u8, 0x42][..], 20),
                ("a.ttf", 6, &[0, 0x41][..], 10),
                ("b.ttf", 6, &[0, 0x43][..], 20),
            ]
        );
        assert_eq!((rows[0].platform_id, rows[0].encoding_id), (3, 1));
    }

    #[test]
    fn uncommitted_writes_are_dropped() {
        let mut store = Store::in_memory().unwrap();
        {
            let writer = store.writer().unwrap();
            writer.insert_font("a.ttf", 10).unwrap();
            writer.insert_name("a.ttf", &raw(4, &[0, 0x41])).unwrap();
        }
        assert!(all_rows(&store).is_empty());
    }

    #[test]
    fn name_without_font_is_an_error() {
        let mut store = Store::in_memory().unwrap();
        // bundled SQLite enforces the font reference, so the orphan row can
        // only get in with enforcement off
        store
            .conn
            .execute_batch("pragma foreign_keys = off")
            .unwrap();
        let writer = store.writer().unwrap();
        writer.insert_name("orphan.ttf", &raw(4, &[0, 0x41])).unwrap();
        writer.commit().unwrap();

        let result = store.for_each_name_row(|_| Ok(()));
        assert!(matches!(
            result,
            Err(Error::Store(rusqlite::Error::InvalidColumnType(5, _, _)))
        ));
    }

    #[test]
    fn callback_error_stops_iteration() {
        let mut store = Store::in_memory().unwrap();
        let writer = store.writer().unwrap();
        writer.insert_font("a.ttf", 10).unwrap();
        writer.insert_name("a.ttf", &raw(4, &[0, 0x41])).unwrap();
        writer.insert_name("a.ttf", &raw(6, &[0, 0x41])).unwrap();
        writer.commit().unwrap();

        let mut seen = 0;
        let result = store.for_each_name_row(|_| {
            seen += 1;
            Err(Error::InvalidIndex("stop".into()))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn create_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fonts.db");
        assert!(matches!(Store::open(&path), Err(Error::Store(_))));
        // opening must not have created the file
        assert!(!path.exists());
        {
            let mut store = Store::create(&path).unwrap();
            let writer = store.writer().unwrap();
            writer.insert_font("bad.ttf", 3).unwrap();
            writer.insert_error("bad.ttf").unwrap();
            writer.commit().unwrap();
        }
        // the schema already exists
        assert!(Store::create(&path).is_err());

        let mut store = Store::open(&path).unwrap();
        assert_eq!(store.error_paths().unwrap(), ["bad.ttf"]);
        assert!(all_rows(&store).is_empty());
        // opened read-only
        let writer = store.writer().unwrap();
        assert!(writer.insert_font("new.ttf", 1).is_err());
    }
}
