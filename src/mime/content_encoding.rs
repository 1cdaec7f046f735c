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

//! Decoding of leaf content transfer encodings.
//!
//! Only what payload access needs: base64 and quoted-printable on top of the
//! identity encodings. No charset handling, no encoded words, no
//! re-encoding.

use std::borrow::Cow;
use std::str;

use super::header::ContentTransferEncoding;

/// Decodes `data` according to its declared transfer encoding.
///
/// Identity encodings are borrowed as-is. Returns `None` only when the
/// payload does not decode under its declared encoding (base64 with bytes
/// outside the alphabet or broken padding); quoted-printable never fails,
/// invalid escapes pass through untransformed.
pub fn decode(
    cte: ContentTransferEncoding,
    data: &[u8],
) -> Option<Cow<'_, [u8]>> {
    match cte {
        ContentTransferEncoding::SevenBit
        | ContentTransferEncoding::EightBit
        | ContentTransferEncoding::Binary => Some(Cow::Borrowed(data)),
        ContentTransferEncoding::Base64 => {
            base64_decode(data).map(Cow::Owned)
        },
        ContentTransferEncoding::QuotedPrintable => Some(qp_decode(data)),
    }
}

fn base64_decode(data: &[u8]) -> Option<Vec<u8>> {
    // Transfer-encoded base64 is line-wrapped, so strip whitespace first.
    let filtered = data
        .iter()
        .copied()
        .filter(|b| !b" \t\r\n".contains(b))
        .collect::<Vec<u8>>();
    base64::decode_config(&filtered, base64::STANDARD).ok()
}

fn qp_decode(data: &[u8]) -> Cow<'_, [u8]> {
    if !data.contains(&b'=') {
        return Cow::Borrowed(data);
    }

    let mut out = Vec::with_capacity(data.len());
    let mut ix = 0;
    while ix < data.len() {
        if b'=' != data[ix] {
            out.push(data[ix]);
            ix += 1;
            continue;
        }

        let rest = &data[ix + 1..];
        if rest.starts_with(b"\r\n") {
            // Soft line break, discard
            ix += 3;
        } else if rest.starts_with(b"\n") {
            // Soft line break with UNIX ending, discard
            ix += 2;
        } else if let Some(byte) = rest
            .get(..2)
            .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .and_then(|hex| str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            ix += 3;
        } else {
            // Invalid escape, pass through untransformed
            out.push(b'=');
            ix += 1;
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn decoded(cte: ContentTransferEncoding, data: &[u8]) -> Option<Vec<u8>> {
        decode(cte, data).map(Cow::into_owned)
    }

    #[test]
    fn identity_borrows() {
        for &cte in &[
            ContentTransferEncoding::SevenBit,
            ContentTransferEncoding::EightBit,
            ContentTransferEncoding::Binary,
        ] {
            match decode(cte, b"hello\xffworld") {
                Some(Cow::Borrowed(b"hello\xffworld")) => (),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn base64_simple() {
        assert_eq!(
            Some(b"hello world".to_vec()),
            decoded(ContentTransferEncoding::Base64, b"aGVsbG8gd29ybGQ=")
        );
    }

    #[test]
    fn base64_wrapped() {
        assert_eq!(
            Some(b"hello world".to_vec()),
            decoded(
                ContentTransferEncoding::Base64,
                b"aGVsbG8g\r\nd29y\r\n bGQ=\r\n"
            )
        );
    }

    #[test]
    fn base64_invalid() {
        assert_eq!(
            None,
            decoded(ContentTransferEncoding::Base64, b"not!base64@@")
        );
    }

    #[test]
    fn qp_escapes() {
        let qp = ContentTransferEncoding::QuotedPrintable;
        assert_eq!(Some(b"hello world".to_vec()), decoded(qp, b"hello world"));
        assert_eq!(Some(b"\xabfoo".to_vec()), decoded(qp, b"=ABfoo"));
        assert_eq!(Some(b"fo\xabo".to_vec()), decoded(qp, b"fo=abo"));
        assert_eq!(Some(b"foo\xab".to_vec()), decoded(qp, b"foo=AB"));
    }

    #[test]
    fn qp_soft_breaks() {
        let qp = ContentTransferEncoding::QuotedPrintable;
        assert_eq!(Some(b"foobar".to_vec()), decoded(qp, b"foo=\r\nbar"));
        assert_eq!(Some(b"foobar".to_vec()), decoded(qp, b"foo=\nbar"));
        assert_eq!(Some(b"foo".to_vec()), decoded(qp, b"foo=\r\n"));
    }

    #[test]
    fn qp_invalid_passthrough() {
        let qp = ContentTransferEncoding::QuotedPrintable;
        assert_eq!(Some(b"foo=()bar".to_vec()), decoded(qp, b"foo=()bar"));
        assert_eq!(Some(b"foo=".to_vec()), decoded(qp, b"foo="));
        assert_eq!(Some(b"foo=\r".to_vec()), decoded(qp, b"foo=\r"));
        assert_eq!(Some(b"foo=+1bar".to_vec()), decoded(qp, b"foo=+1bar"));
    }

    proptest! {
        #[test]
        fn qp_decode_never_fails(
            s in prop::collection::vec(prop::num::u8::ANY, 0..64)
        ) {
            qp_decode(&s);
        }
    }
}
