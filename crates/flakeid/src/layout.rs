use core::{str::FromStr, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    codec::Encoding,
    error::{Error, Field, InvalidArgument, Result},
};

/// The bit-width split of a 64-bit identifier.
///
/// Fields are laid out most-significant-bit first as `[time][generator][sequence]`,
/// so numeric order of identifiers follows creation time.
///
/// ```text
///  Bit Index:  63             22 21             12 11             0
///              +----------------+-----------------+---------------+
///  Field:      | timestamp (42) | generator (10)  | sequence (12) |
///              +----------------+-----------------+---------------+
///              |<----- MSB ---------- 64 bits --------- LSB ----->|
/// ```
///
/// Widths are validated once in [`BitLayout::new`]; the masks and shifts are
/// derived from them so packing is plain shift/mask arithmetic afterwards.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, IdParts};
///
/// let layout = BitLayout::DEFAULT;
/// let id = layout.assemble(1_000, 3, 7).unwrap();
/// assert_eq!(layout.disassemble(id), IdParts { time_offset_ms: 1_000, generator_id: 3, sequence: 7 });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    time_bits: u8,
    generator_bits: u8,
    sequence_bits: u8,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitLayout {
    /// 42 bits of time (~139 years), 10 bits of generator id (1024
    /// generators), 12 bits of sequence (4096 ids per millisecond).
    pub const DEFAULT: Self = Self::from_widths(42, 10, 12);

    /// 42 bits of time, 9 bits of generator id (512 generators), 13 bits of
    /// sequence (8192 ids per millisecond).
    pub const WIDE_SEQUENCE: Self = Self::from_widths(42, 9, 13);

    const fn from_widths(time_bits: u8, generator_bits: u8, sequence_bits: u8) -> Self {
        Self {
            time_bits,
            generator_bits,
            sequence_bits,
        }
    }

    /// Creates a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::LayoutWidth`] unless the widths sum to
    /// exactly 64.
    pub fn new(time_bits: u8, generator_bits: u8, sequence_bits: u8) -> Result<Self> {
        let total = u32::from(time_bits) + u32::from(generator_bits) + u32::from(sequence_bits);
        if total != u64::BITS {
            return Err(InvalidArgument::LayoutWidth {
                time_bits,
                generator_bits,
                sequence_bits,
                total,
            }
            .into());
        }
        Ok(Self::from_widths(time_bits, generator_bits, sequence_bits))
    }

    pub const fn time_bits(&self) -> u8 {
        self.time_bits
    }

    pub const fn generator_bits(&self) -> u8 {
        self.generator_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Largest encodable time offset in milliseconds.
    pub const fn max_time(&self) -> u64 {
        mask(self.time_bits)
    }

    /// Largest valid generator id.
    pub const fn max_generator_id(&self) -> u64 {
        mask(self.generator_bits)
    }

    /// Largest sequence value within one millisecond.
    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Number of distinct generator ids, `2^generator_bits`.
    pub const fn generator_count(&self) -> u128 {
        1u128 << self.generator_bits
    }

    const fn time_shift(&self) -> u8 {
        self.generator_bits + self.sequence_bits
    }

    const fn generator_shift(&self) -> u8 {
        self.sequence_bits
    }

    /// Checks that `generator_id` fits in the generator field.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::GeneratorIdOutOfRange`] otherwise.
    pub fn check_generator_id(&self, generator_id: u64) -> Result<()> {
        if generator_id > self.max_generator_id() {
            return Err(InvalidArgument::GeneratorIdOutOfRange {
                generator_id,
                limit: self.generator_count(),
            }
            .into());
        }
        Ok(())
    }

    /// Checks that a clock reading still fits in the time field.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::FieldOverflow`] for [`Field::Time`] once
    /// the time field is exhausted.
    pub fn check_time(&self, time_offset_ms: u64) -> Result<()> {
        check_field(Field::Time, time_offset_ms, self.max_time())
    }

    /// Packs the three fields into an identifier, rejecting values wider than
    /// their field.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::FieldOverflow`] naming the first field that
    /// does not fit.
    pub fn assemble(&self, time_offset_ms: u64, generator_id: u64, sequence: u64) -> Result<u64> {
        check_field(Field::Time, time_offset_ms, self.max_time())?;
        check_field(Field::Generator, generator_id, self.max_generator_id())?;
        check_field(Field::Sequence, sequence, self.max_sequence())?;
        Ok(self.pack(time_offset_ms, generator_id, sequence))
    }

    /// Packs the three fields, masking each to its width first so no field
    /// can bleed into its neighbour.
    pub(crate) const fn pack(&self, time_offset_ms: u64, generator_id: u64, sequence: u64) -> u64 {
        shl(time_offset_ms & self.max_time(), self.time_shift())
            | shl(generator_id & self.max_generator_id(), self.generator_shift())
            | (sequence & self.max_sequence())
    }

    /// Splits an identifier back into its three fields.
    pub const fn disassemble(&self, value: u64) -> IdParts {
        IdParts {
            time_offset_ms: self.time_of(value),
            generator_id: shr(value, self.generator_shift()) & self.max_generator_id(),
            sequence: self.sequence_of(value),
        }
    }

    pub(crate) const fn time_of(&self, value: u64) -> u64 {
        shr(value, self.time_shift()) & self.max_time()
    }

    pub(crate) const fn sequence_of(&self, value: u64) -> u64 {
        value & self.max_sequence()
    }

    /// Renders `value` as 64 binary digits, most significant bit first, so
    /// the fields read as consecutive runs of `time_bits`, `generator_bits`
    /// and `sequence_bits` characters.
    ///
    /// ```
    /// use flakeid::BitLayout;
    ///
    /// let layout = BitLayout::DEFAULT;
    /// let bits = layout.bits(layout.assemble(1, 3, 2).unwrap());
    /// assert_eq!(bits.len(), 64);
    /// assert_eq!(&bits[42..52], "0000000011");
    /// ```
    pub fn bits(&self, value: u64) -> String {
        format!("{value:064b}")
    }

    /// Decomposes a numeric identifier.
    pub const fn decompose(&self, value: u64) -> IdParts {
        self.disassemble(value)
    }

    /// Decomposes a compact string as produced by
    /// [`Generator::generate`](crate::Generator::generate), i.e. the
    /// [`Encoding::BigEndianCompact`] form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `text` is not a valid compact string.
    pub fn decompose_compact(&self, text: &str) -> Result<IdParts> {
        let value = Encoding::BigEndianCompact.decode(text)?;
        Ok(self.disassemble(value))
    }
}

const fn mask(bits: u8) -> u64 {
    if bits as u32 >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

const fn shl(value: u64, bits: u8) -> u64 {
    if bits as u32 >= u64::BITS { 0 } else { value << bits }
}

const fn shr(value: u64, bits: u8) -> u64 {
    if bits as u32 >= u64::BITS { 0 } else { value >> bits }
}

fn check_field(field: Field, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(InvalidArgument::FieldOverflow { field, value, max }.into());
    }
    Ok(())
}

/// The decomposition of an identifier into its three fields.
///
/// Computed from the identifier and a [`BitLayout`] alone; it carries no
/// state of its own.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdParts {
    /// Milliseconds elapsed since the generator's epoch.
    pub time_offset_ms: u64,
    /// The generator that produced the identifier.
    pub generator_id: u64,
    /// Position within the millisecond.
    pub sequence: u64,
}

impl IdParts {
    /// The time offset as a [`Duration`] since the epoch.
    pub const fn time(&self) -> Duration {
        Duration::from_millis(self.time_offset_ms)
    }

    /// The wall-clock creation time, given the epoch the generator used
    /// (as a [`Duration`] since 1970-01-01 UTC).
    ///
    /// Returns `None` if the sum is not representable as a [`SystemTime`].
    pub fn created_at(&self, epoch: Duration) -> Option<SystemTime> {
        UNIX_EPOCH.checked_add(epoch)?.checked_add(self.time())
    }
}

impl From<u64> for IdParts {
    /// Decomposes with [`BitLayout::DEFAULT`].
    fn from(value: u64) -> Self {
        BitLayout::DEFAULT.disassemble(value)
    }
}

impl From<IdParts> for (u64, u64, u64) {
    fn from(parts: IdParts) -> Self {
        (parts.time_offset_ms, parts.generator_id, parts.sequence)
    }
}

impl FromStr for IdParts {
    type Err = Error;

    /// Decomposes a big-endian compact string with [`BitLayout::DEFAULT`].
    fn from_str(s: &str) -> Result<Self> {
        BitLayout::DEFAULT.decompose_compact(s)
    }
}
