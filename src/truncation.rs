//! Size bookkeeping for a single open handle.

/// What happened to a file between two polls, judged by its size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Growth {
    /// Nothing new past the read offset.
    Unchanged,
    /// This many bytes are available past the read offset.
    Appended(u64),
    /// The file was shrunk below the read offset.
    Truncated,
}

/// Last observed size and read offset of the currently open handle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Checkpoint {
    pub(crate) size: u64,
    pub(crate) offset: u64,
}

impl Checkpoint {
    pub(crate) fn at(offset: u64) -> Self {
        Checkpoint {
            size: offset,
            offset,
        }
    }

    /// Records `size` as the latest observation and classifies it against the
    /// read offset. Equality is "no new data", not truncation.
    pub(crate) fn observe(&mut self, size: u64) -> Growth {
        self.size = size;

        if size < self.offset {
            Growth::Truncated
        } else if size == self.offset {
            Growth::Unchanged
        } else {
            Growth::Appended(size - self.offset)
        }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.offset += bytes;
        self.size = self.size.max(self.offset);
    }

    pub(crate) fn rewind(&mut self) {
        self.offset = 0;
    }
}
