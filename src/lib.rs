pub mod ast;
pub mod environment;
pub mod error;
pub mod globals;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;
