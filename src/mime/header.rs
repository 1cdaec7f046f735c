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

//! Parsing for the handful of RFC 2045/2183 structured headers the entity
//! tree consumes.
//!
//! Parsers are byte-oriented and 8-bit clean. Header values are expected in
//! their raw, possibly folded form; folding whitespace is treated as simple
//! whitespace, so no separate unfolding pass is needed. All parse functions
//! are total: anything unparseable is `None`, never an error.

use std::borrow::Cow;
use std::str;

use nom::*;

/// A parsed `Content-Type` header value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentType<'a> {
    pub typ: Cow<'a, [u8]>,
    pub subtype: Cow<'a, [u8]>,
    pub parms: Vec<(Cow<'a, [u8]>, Cow<'a, [u8]>)>,
}

impl<'a> ContentType<'a> {
    pub fn is_type(&self, typ: &str) -> bool {
        self.typ.eq_ignore_ascii_case(typ.as_bytes())
    }

    pub fn is_subtype(&self, subtype: &str) -> bool {
        self.subtype.eq_ignore_ascii_case(subtype.as_bytes())
    }

    /// Looks the named parameter up case-insensitively.
    pub fn parm(&self, name: &str) -> Option<&[u8]> {
        self.parms
            .iter()
            .find(|&&(ref n, _)| n.eq_ignore_ascii_case(name.as_bytes()))
            .map(|&(_, ref v)| &**v)
    }

    pub fn into_owned(self) -> ContentType<'static> {
        ContentType {
            typ: Cow::Owned(self.typ.into_owned()),
            subtype: Cow::Owned(self.subtype.into_owned()),
            parms: own_parms(self.parms),
        }
    }
}

/// A parsed `Content-Disposition` header value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDisposition<'a> {
    pub disposition: Cow<'a, [u8]>,
    pub parms: Vec<(Cow<'a, [u8]>, Cow<'a, [u8]>)>,
}

impl<'a> ContentDisposition<'a> {
    pub fn into_owned(self) -> ContentDisposition<'static> {
        ContentDisposition {
            disposition: Cow::Owned(self.disposition.into_owned()),
            parms: own_parms(self.parms),
        }
    }
}

fn own_parms(
    parms: Vec<(Cow<[u8]>, Cow<[u8]>)>,
) -> Vec<(Cow<'static, [u8]>, Cow<'static, [u8]>)> {
    parms
        .into_iter()
        .map(|(n, v)| (Cow::Owned(n.into_owned()), Cow::Owned(v.into_owned())))
        .collect()
}

/// The `Content-Transfer-Encoding` of a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentTransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
}

impl Default for ContentTransferEncoding {
    fn default() -> Self {
        ContentTransferEncoding::SevenBit
    }
}

// RFC 2822 3.2.2 "quoted-pair", including the 8-bit clean "obsolete" syntax
named!(quoted_pair, preceded!(char!('\\'), take!(1)));

// RFC 2822 3.2.3 "Folding white space".
// Unfolding is not performed separately, so the line-ending characters are
// treated as simple whitespace.
named!(fws, map!(is_a!(" \t\r\n"), |_| &b" "[..]));

// RFC 2822 3.2.3 "Comment text".
named!(ctext, is_not!("()\\ \t\r\n"));

// RFC 2822 3.2.3 "Comment content".
named!(
    ccontent<()>,
    alt!(
        map!(ctext, |_| ())
            | map!(quoted_pair, |_| ())
            | map!(fws, |_| ())
            | comment
    )
);

// RFC 2822 3.2.3 "Comment". Note it is recursive.
named!(
    comment<()>,
    delimited!(char!('('), map!(many0_count!(ccontent), |_| ()), char!(')'))
);

// RFC 2822 3.2.3 "Comment or folding white space".
named!(
    cfws<()>,
    map!(many0_count!(alt!(map!(fws, |_| ()) | comment)), |_| ())
);

// RFC 2822 3.2.5 "Quoted [string] text"
// Amended by RFC 6532 to include all non-ASCII characters
named!(qtext, is_not!(" \t\r\n\\\""));

// RFC 2822 3.2.5 "Quoted [string] content"
named!(qcontent, alt!(qtext | quoted_pair | fws));

// RFC 2822 3.2.5 "Quoted string"
named!(
    quoted_string<Cow<[u8]>>,
    delimited!(
        pair!(opt!(cfws), char!('"')),
        fold_many0!(
            qcontent,
            Cow::Borrowed(&[] as &[u8]),
            |mut acc: Cow<[u8]>, item| {
                if acc.is_empty() {
                    acc = Cow::Borrowed(item);
                } else {
                    acc.to_mut().extend_from_slice(item);
                }
                acc
            }
        ),
        pair!(char!('"'), opt!(cfws))
    )
);

// RFC 2045 5.1 "token": any CHAR except SPACE, CTLs, and tspecials
fn token_char(ch: u8) -> bool {
    ch > b' ' && ch < 0x7f && !b"()<>@,;:\\\"/[]?=".contains(&ch)
}

named!(token, take_while1!(token_char));

// RFC 2045 5.1 parameter value
named!(
    parm_value<Cow<[u8]>>,
    alt!(map!(token, Cow::Borrowed) | quoted_string)
);

// RFC 2045 5.1 "parameter"
named!(
    parameter<(Cow<[u8]>, Cow<[u8]>)>,
    separated_pair!(
        map!(token, Cow::Borrowed),
        tuple!(opt!(cfws), char!('='), opt!(cfws)),
        parm_value
    )
);

// The `*(";" parameter)` tail shared by Content-Type and
// Content-Disposition. Trailing garbage after the last parseable parameter
// is left unconsumed and thereby discarded.
named!(
    parameters<Vec<(Cow<[u8]>, Cow<[u8]>)>>,
    many0!(preceded!(
        tuple!(opt!(cfws), char!(';'), opt!(cfws)),
        parameter
    ))
);

// RFC 2045 5.1 content type
named!(
    content_type<ContentType>,
    map!(
        tuple!(opt!(cfws), token, char!('/'), token, parameters),
        |(_, typ, _, subtype, parms)| ContentType {
            typ: Cow::Borrowed(typ),
            subtype: Cow::Borrowed(subtype),
            parms,
        }
    )
);

// RFC 2183 2 disposition
named!(
    content_disposition<ContentDisposition>,
    map!(
        tuple!(opt!(cfws), token, parameters),
        |(_, disposition, parms)| ContentDisposition {
            disposition: Cow::Borrowed(disposition),
            parms,
        }
    )
);

fn language_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || b'-' == ch
}

pub fn parse_content_type(value: &[u8]) -> Option<ContentType<'_>> {
    match content_type(value) {
        Ok((_, ct)) => Some(ct),
        // The value ran out exactly where further whitespace or parameter
        // text could still follow. Rerun against a terminated copy so the
        // grammar can conclude.
        Err(Err::Incomplete(_)) => {
            let mut terminated = value.to_vec();
            terminated.push(0);
            content_type(&terminated)
                .ok()
                .map(|(_, ct)| ct.into_owned())
        },
        Err(_) => None,
    }
}

pub fn parse_content_disposition(
    value: &[u8],
) -> Option<ContentDisposition<'_>> {
    match content_disposition(value) {
        Ok((_, cd)) => Some(cd),
        Err(Err::Incomplete(_)) => {
            let mut terminated = value.to_vec();
            terminated.push(0);
            content_disposition(&terminated)
                .ok()
                .map(|(_, cd)| cd.into_owned())
        },
        Err(_) => None,
    }
}

// RFC 3282 content language. Only the first tag of a list is retained.
pub fn parse_content_language(value: &[u8]) -> Option<&[u8]> {
    let start = value.iter().position(|&b| !b" \t\r\n".contains(&b))?;
    let len = value[start..]
        .iter()
        .take_while(|&&b| language_char(b))
        .count();

    if 0 == len {
        None
    } else {
        Some(&value[start..start + len])
    }
}

pub fn parse_content_location(value: &[u8]) -> Option<&str> {
    // RFC 2017 locations are URIs, which have no interior whitespace, so
    // stripping the folding and padding around the value is sufficient.
    str::from_utf8(value)
        .ok()
        .map(|s| s.trim_matches(|c: char| " \t\r\n".contains(c)))
        .filter(|s| !s.is_empty())
}

pub fn parse_content_transfer_encoding(
    value: &[u8],
) -> Option<ContentTransferEncoding> {
    let start = value.iter().position(|&b| !b" \t\r\n".contains(&b))?;
    let len = value[start..]
        .iter()
        .take_while(|&&b| token_char(b))
        .count();
    let tok = &value[start..start + len];

    if tok.eq_ignore_ascii_case(b"7bit") {
        Some(ContentTransferEncoding::SevenBit)
    } else if tok.eq_ignore_ascii_case(b"8bit") {
        Some(ContentTransferEncoding::EightBit)
    } else if tok.eq_ignore_ascii_case(b"binary") {
        Some(ContentTransferEncoding::Binary)
    } else if tok.eq_ignore_ascii_case(b"base64") {
        Some(ContentTransferEncoding::Base64)
    } else if tok.eq_ignore_ascii_case(b"quoted-printable") {
        Some(ContentTransferEncoding::QuotedPrintable)
    } else {
        None
    }
}
