//! Cloud Notes terminal client.
//!
//! An interactive client for the Cloud Notes service: sign in, list and
//! mutate your notes, search within and across accounts, view and adopt
//! other people's notes, and trigger server-side PDF export. The client
//! holds no durable state beyond the signed-in account name; the note
//! collection is re-fetched from the service after every mutation.

use cloud_notes::{api_root, session_file, App, HttpStore, Session};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    env_logger::init();

    let root = api_root();
    let store = HttpStore::new(root.clone()).expect("Failed to build HTTP client");
    let session = Session::load(session_file());

    println!("Cloud Notes client, talking to {}", root);

    App::new(store, session).run().await;
}
