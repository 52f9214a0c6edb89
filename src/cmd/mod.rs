pub mod gen_mapping;
pub mod run;
