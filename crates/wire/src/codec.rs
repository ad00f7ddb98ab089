//! Word-level helpers shared by the message encoders and decoders.

use omnibridge_primitives::{decimals::DecimalsDelta, types::Address, U256};

use crate::{errors::WireError, WORD_SIZE};

type Word = [u8; WORD_SIZE];

#[derive(Debug, Default)]
pub(crate) struct WordWriter {
    buf: Vec<u8>,
}

impl WordWriter {
    pub(crate) fn with_words(words: usize) -> Self {
        Self {
            buf: Vec::with_capacity(words * WORD_SIZE),
        }
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self {
        let mut word = [0u8; WORD_SIZE];
        word[24..].copy_from_slice(&value.to_be_bytes());
        self.buf.extend_from_slice(&word);
        self
    }

    pub(crate) fn bool(&mut self, value: bool) -> &mut Self {
        self.u64(u64::from(value))
    }

    pub(crate) fn address(&mut self, value: &Address) -> &mut Self {
        let mut word = [0u8; WORD_SIZE];
        word[12..].copy_from_slice(value.as_bytes());
        self.buf.extend_from_slice(&word);
        self
    }

    pub(crate) fn u256(&mut self, value: U256) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Two's complement, sign-extended over the whole word.
    pub(crate) fn delta(&mut self, value: DecimalsDelta) -> &mut Self {
        let fill = if value.get() < 0 { 0xff } else { 0x00 };
        let mut word = [fill; WORD_SIZE];
        word[WORD_SIZE - 1] = value.get() as u8;
        self.buf.extend_from_slice(&word);
        self
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub(crate) struct WordReader<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> WordReader<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, index: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.index * WORD_SIZE
    }

    /// Ensures exactly `words` more words are left in the payload.
    pub(crate) fn expect_exact(&self, words: usize) -> Result<(), WireError> {
        let needed = words * WORD_SIZE;
        let available = self.remaining();
        if available < needed {
            return Err(WireError::Truncated { needed, available });
        }
        if available > needed {
            return Err(WireError::TrailingBytes(available - needed));
        }

        Ok(())
    }

    fn word(&mut self) -> Result<(usize, Word), WireError> {
        let start = self.index * WORD_SIZE;
        let end = start + WORD_SIZE;
        let slice = self.bytes.get(start..end).ok_or(WireError::Truncated {
            needed: end,
            available: self.bytes.len(),
        })?;

        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(slice);
        let index = self.index;
        self.index += 1;

        Ok((index, word))
    }

    pub(crate) fn u64(&mut self, field: &'static str) -> Result<u64, WireError> {
        let (index, word) = self.word()?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(WireError::NonCanonical { field, index });
        }

        let mut be = [0u8; 8];
        be.copy_from_slice(&word[24..]);
        Ok(u64::from_be_bytes(be))
    }

    pub(crate) fn u8(&mut self, field: &'static str) -> Result<u8, WireError> {
        let index = self.index;
        let value = self.u64(field)?;
        u8::try_from(value).map_err(|_| WireError::NonCanonical { field, index })
    }

    pub(crate) fn bool(&mut self, field: &'static str) -> Result<bool, WireError> {
        let index = self.index;
        match self.u64(field)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(WireError::NonCanonical { field, index }),
        }
    }

    pub(crate) fn address(&mut self, field: &'static str) -> Result<Address, WireError> {
        let (index, word) = self.word()?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(WireError::NonCanonical { field, index });
        }

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address::new(bytes))
    }

    pub(crate) fn u256(&mut self) -> Result<U256, WireError> {
        let (_, word) = self.word()?;
        Ok(U256::from_be_bytes(word))
    }

    pub(crate) fn delta(&mut self, field: &'static str) -> Result<DecimalsDelta, WireError> {
        let (index, word) = self.word()?;
        let value = word[WORD_SIZE - 1] as i8;
        let fill = if value < 0 { 0xff } else { 0x00 };
        if word[..WORD_SIZE - 1].iter().any(|b| *b != fill) {
            return Err(WireError::NonCanonical { field, index });
        }

        DecimalsDelta::new(value).map_err(|_| WireError::NonCanonical { field, index })
    }
}
