// Module declarations for all test files in the restore directory
mod by_id;
mod facts;
mod latest;
mod partial;
