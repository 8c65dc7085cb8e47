pub mod connection;
pub mod document_store;
pub mod in_memory;
pub mod mongo;

pub use connection::connect;
pub use document_store::{DocumentFields, DocumentStore};
pub use in_memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;
