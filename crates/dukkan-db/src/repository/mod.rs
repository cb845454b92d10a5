//! # Repositories
//!
//! One repository per collection. Each is generic over
//! [`dukkan_store::DocumentStore`] and receives its store at construction -
//! tests wire in the in-memory engine, production wires in the hosted-store
//! client.

pub mod counter;
pub mod job;
pub mod payment;
pub mod phone;
pub mod rep;
pub mod settlement;
pub mod technician;

pub use counter::CounterRepository;
pub use job::JobRepository;
pub use payment::PaymentRepository;
pub use phone::PhoneRepository;
pub use rep::RepRepository;
pub use settlement::SettlementRepository;
pub use technician::TechnicianRepository;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::warn;

use dukkan_store::Document;

/// Decodes a batch of documents, skipping (and warn-logging) any that no
/// longer match the expected shape. A single corrupt document must not
/// take down a whole listing.
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(collection, id = %doc.id, %err, "skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Turns a raw collection subscription into a typed one by decoding every
/// snapshot on a background task.
pub(crate) fn spawn_decoder<T>(
    collection: &'static str,
    mut rx: watch::Receiver<Vec<Document>>,
) -> watch::Receiver<Vec<T>>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let initial = decode_all(collection, &rx.borrow());
    let (tx, out) = watch::channel(initial);
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let docs = rx.borrow().clone();
            if tx.send(decode_all(collection, &docs)).is_err() {
                // Receiver dropped; stop decoding.
                break;
            }
        }
    });
    out
}
