pub mod core;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod travel;
pub mod vector_math;
