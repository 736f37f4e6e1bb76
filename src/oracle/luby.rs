/*!
An iterator to generate the luby sequence, used to schedule restarts.

See <https://oeis.org/A182105> for details on the luby sequence.

```rust
# use undertaker::oracle::luby::Luby;
let first = Luby::default().take(7).collect::<Vec<_>>();
assert_eq!(first, vec![1, 2, 1, 1, 2, 4, 1]);
```
*/

/// Representation used for numbers in a luby sequence.
pub type LubyRepresentation = u32;

#[derive(Debug)]
pub struct Luby {
    curr: LubyRepresentation,
    next: LubyRepresentation,
}

// The default iterator is on the first element of the sequence.
impl Default for Luby {
    fn default() -> Self {
        let mut luby = Luby { curr: 0, next: 0 };
        luby.next();
        luby
    }
}

impl Iterator for Luby {
    type Item = LubyRepresentation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.curr & self.curr.wrapping_neg() == self.next {
            self.curr = self.curr.checked_add(1)?;
            self.next = 1;
        } else {
            self.next = self.next.checked_add(self.next)?;
        }

        Some(self.next)
    }
}

impl Luby {
    /// The current element of the sequence.
    pub fn current(&self) -> LubyRepresentation {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // https://oeis.org/A182105
    const LUBY_SLICE: &[LubyRepresentation] = &[
        1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8,
        16, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4,
    ];

    #[test]
    fn luby() {
        let mut l = Luby { curr: 0, next: 0 };
        for known_value in LUBY_SLICE {
            assert_eq!(l.next(), Some(*known_value))
        }
    }

    #[test]
    fn current_follows_next() {
        let mut l = Luby::default();
        assert_eq!(l.current(), 1);
        l.next();
        l.next();
        assert_eq!(l.current(), 2);
    }
}
