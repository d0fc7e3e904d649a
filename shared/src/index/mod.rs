mod index_key_table;

pub use index_key_table::IndexKeyTable;
