//! # API Route Modules
//!
//! - `updates` — client-facing read of authorization flags and the latest
//!   published module versions (`GET /atualizacao/:numero_serie`).
//! - `sync` — password-gated synchronization that upserts a client's
//!   module authorization flags (`POST /sincronizar/:numero_serie`).
//! - `publish` — admin upload of new module artifacts, relayed to the
//!   transfer destination and recorded in the version ledger
//!   (`POST /admin/publicar`).

pub mod publish;
pub mod sync;
pub mod updates;
