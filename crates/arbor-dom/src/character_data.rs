//! [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
//!
//! Offsets and counts are measured in UTF-16 code units, as the DOM
//! requires, while the data itself is stored as a Rust `String`.

/// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
///
/// "Each node inheriting from the CharacterData interface has an associated
/// mutable string called data."
///
/// Shared by `Text`, `CdataSection`, `Comment` and `ProcessingInstruction`
/// nodes.
///
/// NOTE: The DOM throws an "IndexSizeError" when an offset is past the end of
/// the data. This implementation clamps the offset to the length instead, so
/// none of these operations can fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterData {
    data: String,
}

impl CharacterData {
    /// Create character data holding `data`.
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// "The data getter steps are to return this's data."
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// "The data setter steps are to replace data with node this, offset 0,
    /// count this's length, and data the given value."
    pub fn set_data(&mut self, data: &str) {
        self.replace_data(0, self.length(), data);
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-length)
    ///
    /// "The length getter steps are to return this's length."
    ///
    /// Length in UTF-16 code units.
    #[must_use]
    pub fn length(&self) -> usize {
        self.data.chars().map(char::len_utf16).sum()
    }

    /// [§ 4.10 substring data](https://dom.spec.whatwg.org/#concept-cd-substring)
    ///
    /// "If offset plus count is greater than length, return a string whose
    /// value is the code units from the offsetth code unit to the end of
    /// node's data, and then return."
    #[must_use]
    pub fn substring_data(&self, offset: usize, count: usize) -> String {
        let (start, end) = self.byte_range(offset, count);
        self.data[start..end].to_string()
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-appenddata)
    ///
    /// "replace data with node this, offset this's length, count 0, and data
    /// the given value."
    pub fn append_data(&mut self, data: &str) {
        self.data.push_str(data);
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-insertdata)
    ///
    /// "replace data with node this, offset offset, count 0, and data data."
    pub fn insert_data(&mut self, offset: usize, data: &str) {
        self.replace_data(offset, 0, data);
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-deletedata)
    ///
    /// "replace data with node this, offset offset, count count, and data the
    /// empty string."
    pub fn delete_data(&mut self, offset: usize, count: usize) {
        self.replace_data(offset, count, "");
    }

    /// [§ 4.10 replace data](https://dom.spec.whatwg.org/#concept-cd-replace)
    pub fn replace_data(&mut self, offset: usize, count: usize, data: &str) {
        // STEP 1-3: "Let length be node's length. If offset is greater than
        //           length, then throw. If offset plus count is greater than
        //           length, then set count to length minus offset."
        //
        // Both clamps happen inside byte_range.
        let (start, end) = self.byte_range(offset, count);

        // STEP 5-7: "Insert data into node's data after offset code units.
        //           Let delete offset be offset + data's length. Starting from
        //           delete offset code units, remove count code units from
        //           node's data."
        self.data.replace_range(start..end, data);
    }

    /// Map a UTF-16 `(offset, count)` pair onto a byte range of `data`,
    /// clamping both ends to the data.
    fn byte_range(&self, offset: usize, count: usize) -> (usize, usize) {
        let start = self.byte_index(offset);
        let end = self.byte_index(offset.saturating_add(count));
        (start, end.max(start))
    }

    /// Byte index of the character containing UTF-16 unit `offset`.
    ///
    /// An offset inside a surrogate pair snaps to the start of that
    /// character; an offset past the end maps to the end.
    fn byte_index(&self, offset: usize) -> usize {
        let mut units = 0;
        for (index, c) in self.data.char_indices() {
            let next = units + c.len_utf16();
            if offset < next {
                return index;
            }
            units = next;
        }
        self.data.len()
    }
}

impl From<&str> for CharacterData {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl From<String> for CharacterData {
    fn from(data: String) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_index_counts_utf16_units() {
        // U+1F600 is one char, two UTF-16 units, four UTF-8 bytes.
        let data = CharacterData::new("a\u{1F600}b");
        assert_eq!(data.length(), 4);
        assert_eq!(data.byte_index(0), 0);
        assert_eq!(data.byte_index(1), 1);
        assert_eq!(data.byte_index(2), 1);
        assert_eq!(data.byte_index(3), 5);
        assert_eq!(data.byte_index(4), 6);
        assert_eq!(data.byte_index(40), 6);
    }

    #[test]
    fn substring_never_splits_a_character() {
        let data = CharacterData::new("a\u{1F600}b");
        assert_eq!(data.substring_data(1, 2), "\u{1F600}");
        assert_eq!(data.substring_data(3, 1), "b");
    }
}
