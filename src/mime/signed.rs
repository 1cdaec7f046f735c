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

//! The `multipart/signed` refinement, per RFC 5751.
//!
//! Mail handling has to stay resilient to adversarial content, so nothing
//! here raises once the tree is built: a forged or garbled signature
//! degrades to "not valid", a structurally non-conforming body to "not
//! applicable". Callers are deliberately given a single coarse outcome and
//! no way to distinguish failure causes.

use std::borrow::Cow;

use log::debug;
use openssl::error::ErrorStack;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;

use super::entity::{Body, EntityId, Message};
use super::multipart::Multipart;

/// Read-only view of a `multipart/signed` body.
///
/// By the RFC 5751 convention, child 0 is the signed content (any MIME
/// type) and child 1 the detached PKCS#7 signature over child 0's wire
/// form.
pub struct SignedBody<'a> {
    message: &'a Message,
    parts: &'a Multipart,
}

impl Message {
    /// Returns the signed-body view of `id`, if that entity is a
    /// `multipart/signed` container.
    pub fn signed_body(&self, id: EntityId) -> Option<SignedBody<'_>> {
        match *self.entity(id).body() {
            Body::Signed(ref parts) => Some(SignedBody {
                message: self,
                parts,
            }),
            _ => None,
        }
    }
}

impl<'a> SignedBody<'a> {
    pub fn parts(&self) -> &Multipart {
        self.parts
    }

    /// Gets the certificates embedded in the PKCS#7 signature container.
    ///
    /// `None` if the body does not have the conventional two-part shape or
    /// the container does not decode; signature metadata simply cannot be
    /// determined for such a body.
    pub fn certificates(&self) -> Option<Vec<X509>> {
        let der = self.signature_der()?;
        extract_signers(&der).ok()
    }

    /// Checks that the signature is valid and the signed content unaltered.
    ///
    /// The content covered by the detached signature is the signed entity's
    /// exact wire form: its own headers and content, no outer framing.
    ///
    /// Every failure — non-conforming part count, malformed container,
    /// altered content, chain validation failure — collapses to `false`.
    pub fn verify_signature(&self) -> bool {
        let content = match self.parts.child(0) {
            Some(child) => self.message.raw_bytes(child),
            None => return false,
        };
        let der = match self.signature_der() {
            Some(der) => der,
            None => return false,
        };

        verify_detached(content, &der).is_ok()
    }

    /// The decoded octets of the detached signature entity.
    fn signature_der(&self) -> Option<Cow<'a, [u8]>> {
        // multipart/signed must always have exactly 2 parts; with any other
        // shape the signature cannot be located.
        if 2 != self.parts.len() {
            debug!(
                "multipart/signed has {} parts; cannot locate signature",
                self.parts.len()
            );
            return None;
        }

        self.message.decoded_leaf_content(self.parts.child(1)?)
    }
}

fn extract_signers(der: &[u8]) -> Result<Vec<X509>, ErrorStack> {
    let pkcs7 = Pkcs7::from_der(der)?;
    let extra = Stack::new()?;
    let signers = pkcs7.signers(&extra, Pkcs7Flags::empty())?;

    Ok(signers.iter().map(|cert| cert.to_owned()).collect())
}

fn verify_detached(content: &[u8], der: &[u8]) -> Result<(), ErrorStack> {
    let pkcs7 = Pkcs7::from_der(der)?;
    let extra = Stack::new()?;
    let signers = pkcs7.signers(&extra, Pkcs7Flags::empty())?;

    // Verification is anchored at the certificates the container itself
    // carries; trust policy beyond that belongs to the caller.
    let mut store = X509StoreBuilder::new()?;
    for cert in &signers {
        store.add_cert(cert.to_owned())?;
    }
    let store = store.build();

    pkcs7.verify(&extra, &store, Some(content), None, Pkcs7Flags::BINARY)
}
