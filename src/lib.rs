//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Mimesect.
//
// Mimesect is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mimesect is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mimesect. If not, see <http://www.gnu.org/licenses/>.

//! Mimesect models a mail message body as an immutable tree of MIME
//! entities and provides two operations over that tree: verification of
//! `multipart/signed` bodies per the S/MIME detached-signature convention
//! (RFC 5751), and computation of the part specifiers IMAP clients use to
//! address individual entities (RFC 3501 §6.4.5).
//!
//! ```no_run
//! use mimesect::Message;
//!
//! # fn example(raw: Vec<u8>) -> Result<(), mimesect::Error> {
//! let message = Message::parse(raw)?;
//!
//! if let Some(signed) = message.signed_body(message.root()) {
//!     println!("valid: {}", signed.verify_signature());
//! }
//!
//! for (id, _) in message.entities() {
//!     println!("BODY[{}]", message.part_specifier(id));
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod imap;
pub mod mime;
pub mod support;

pub use crate::mime::entity::{Body, Entity, EntityId, Message};
pub use crate::mime::header::{
    ContentDisposition, ContentTransferEncoding, ContentType,
};
pub use crate::mime::multipart::Multipart;
pub use crate::mime::signed::SignedBody;
pub use crate::support::error::Error;
