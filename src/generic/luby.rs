/*!
The luby sequence, used to schedule restarts.

Elements are generated by Knuth's 'reluctant doubling' on a pair (*u*, *v*), starting from (1, 1):
- If *u* & -*u* = *v*, the pair becomes (*u* + 1, 1).
- Otherwise, the pair becomes (*u*, 2*v*).

The element of the sequence is *v*.
See <https://oeis.org/A182105>.
*/

/// Representation used for numbers in a luby sequence.
pub type LubyRepresentation = u32;

/// A luby sequence, positioned on its first element.
pub struct Luby {
    u: LubyRepresentation,
    v: LubyRepresentation,
}

impl Default for Luby {
    fn default() -> Self {
        Luby { u: 1, v: 1 }
    }
}

impl Luby {
    pub fn current(&self) -> LubyRepresentation {
        self.v
    }
}

impl Iterator for Luby {
    type Item = LubyRepresentation;

    /// Moves to the next element, and returns the element moved from.
    ///
    /// None once the representation overflows.
    fn next(&mut self) -> Option<Self::Item> {
        let element = self.v;
        match self.u & self.u.wrapping_neg() == self.v {
            true => {
                self.u = self.u.checked_add(1)?;
                self.v = 1;
            }
            false => self.v = self.v.checked_mul(2)?,
        }
        Some(element)
    }
}
