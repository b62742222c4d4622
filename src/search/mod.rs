pub mod catalog_index;
