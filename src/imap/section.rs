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

//! IMAP part addressing over the entity tree.
//!
//! RFC 3501 §6.4.5 assigns each part of a multipart a number starting at 1,
//! so that, e.g., `2.3` is the third sub-part of the second part. The
//! message as a whole is part `1`, and deeper subscripts are joined with
//! dots.

use crate::mime::entity::{EntityId, Message};

impl Message {
    /// Computes the IMAP part specifier addressing `id`, usable verbatim as
    /// the argument of a `FETCH BODY[...]` command.
    ///
    /// The root of the tree is always `"1"`. For anything else, the parent
    /// chain is walked upward, prepending each node's 1-based document-order
    /// position among its parent's children. The walk is O(depth) and
    /// computed on demand; nesting is shallow and the value is only needed
    /// when formatting protocol responses.
    pub fn part_specifier(&self, id: EntityId) -> String {
        let mut specifier = String::new();
        let mut current = id;

        while let Some(parent) = self.entity(current).parent() {
            if let Some(position) = self
                .entity(parent)
                .multipart()
                .and_then(|parts| parts.position_of(current))
            {
                specifier.insert_str(0, &format!(".{}", position + 1));
            }
            current = parent;
        }

        specifier.insert_str(0, "1");
        specifier
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use crate::mime::entity::{EntityId, Message};

    fn parse(message: &str) -> Message {
        let message = message.replace('\n', "\r\n");
        Message::parse(message.into_bytes()).unwrap()
    }

    #[test]
    fn root_is_1() {
        let message = parse("Content-Type: text/plain\n\nhello\n");
        assert_eq!("1", message.part_specifier(message.root()));
    }

    #[test]
    fn multipart_root_is_still_1() {
        let message = parse(
            "\
Content-Type: multipart/mixed; boundary=b

--b

x
--b--
",
        );
        assert_eq!("1", message.part_specifier(message.root()));
    }

    #[test]
    fn second_child_is_1_2() {
        let message = parse(
            "\
Content-Type: multipart/mixed; boundary=b

--b

part a
--b

part b
--b

part c
--b--
",
        );

        let parts = message.entity(message.root()).multipart().unwrap();
        assert_eq!(3, parts.len());
        assert_eq!(
            "1.2",
            message.part_specifier(parts.child(1).unwrap())
        );
    }

    #[test]
    fn nested_leaf_is_1_3_2() {
        let message = parse(
            "\
Content-Type: multipart/mixed; boundary=outer

--outer

part a
--outer

part b
--outer
Content-Type: multipart/alternative; boundary=inner

--inner

nested a
--inner

nested b
--inner--
--outer--
",
        );

        let root = message.entity(message.root()).multipart().unwrap();
        let third = root.child(2).unwrap();
        let inner = message.entity(third).multipart().unwrap();
        let leaf = inner.child(1).unwrap();

        assert_eq!("1.3", message.part_specifier(third));
        assert_eq!("1.3.2", message.part_specifier(leaf));
    }

    /// Checks the entire numbering of `id`'s subtree against the expected
    /// specifier derived from the path walked to reach it.
    fn check_subtree(message: &Message, id: EntityId, expected: &str) {
        assert_eq!(expected, message.part_specifier(id));

        if let Some(parts) = message.entity(id).multipart() {
            for (ix, &child) in parts.children().iter().enumerate() {
                check_subtree(
                    message,
                    child,
                    &format!("{}.{}", expected, ix + 1),
                );
            }
        }
    }

    fn matches_grammar(specifier: &str) -> bool {
        let mut subscripts = specifier.split('.');
        if Some("1") != subscripts.next() {
            return false;
        }

        subscripts.all(|s| {
            !s.is_empty()
                && !s.starts_with('0')
                && s.bytes().all(|b| b.is_ascii_digit())
        })
    }

    #[derive(Debug, Clone)]
    enum Shape {
        Leaf,
        Multi(Vec<Shape>),
    }

    fn shapes() -> impl Strategy<Value = Shape> {
        Just(Shape::Leaf).prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec(inner, 1..5).prop_map(Shape::Multi)
        })
    }

    fn render(shape: &Shape, out: &mut String, counter: &mut u32) {
        match *shape {
            Shape::Leaf => {
                out.push_str("Content-Type: text/plain\r\n\r\nleaf\r\n");
            },
            Shape::Multi(ref children) => {
                let boundary = format!("b{:04}", *counter);
                *counter += 1;

                out.push_str(&format!(
                    "Content-Type: multipart/mixed; boundary={}\r\n\r\n",
                    boundary
                ));
                for child in children {
                    out.push_str(&format!("--{}\r\n", boundary));
                    render(child, out, counter);
                }
                out.push_str(&format!("--{}--\r\n", boundary));
            },
        }
    }

    fn shape_len(shape: &Shape) -> usize {
        match *shape {
            Shape::Leaf => 1,
            Shape::Multi(ref children) => {
                1 + children.iter().map(shape_len).sum::<usize>()
            },
        }
    }

    proptest! {
        #[test]
        fn specifiers_of_arbitrary_trees(shape in shapes()) {
            let mut text = String::new();
            let mut counter = 0;
            render(&shape, &mut text, &mut counter);

            let message = Message::parse(text.into_bytes()).unwrap();
            prop_assert_eq!(shape_len(&shape), message.entities().count());

            check_subtree(&message, message.root(), "1");
            for (id, _) in message.entities() {
                prop_assert!(matches_grammar(&message.part_specifier(id)));
            }
        }
    }
}
