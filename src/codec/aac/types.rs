use crate::error::{HlsError, Result};
use crate::utils::{BitReader, BitWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Main = 0,
    LC = 1,
    SSR = 2,
    LTP = 3,
}

impl From<u8> for ProfileType {
    fn from(value: u8) -> Self {
        match value {
            0 => ProfileType::Main,
            1 => ProfileType::LC,
            2 => ProfileType::SSR,
            3 => ProfileType::LTP,
            _ => ProfileType::LC, // Default to LC for unknown profiles
        }
    }
}

/// The parts of an MPEG-4 AudioSpecificConfig that ADTS can express.
#[derive(Debug, Clone, PartialEq)]
pub struct AACConfig {
    pub profile: ProfileType,
    pub sample_rate_index: u8,
    pub channel_configuration: u8,
}

impl Default for AACConfig {
    fn default() -> Self {
        Self {
            profile: ProfileType::LC,
            sample_rate_index: 4,     // 44100 Hz
            channel_configuration: 2, // Stereo
        }
    }
}

impl AACConfig {
    /// Parses the AudioSpecificConfig stored as the track's init data.
    pub fn parse(asc: &[u8]) -> Result<Self> {
        if asc.len() < 2 {
            return Err(HlsError::Codec(format!(
                "AudioSpecificConfig of {} bytes is too short",
                asc.len()
            )));
        }
        let mut reader = BitReader::new(asc);
        let object_type = reader.read_bits(5)? as u8;
        if object_type == 0 || object_type > 4 {
            return Err(HlsError::Codec(format!(
                "audio object type {} has no ADTS profile",
                object_type
            )));
        }
        let sample_rate_index = reader.read_bits(4)? as u8;
        if sample_rate_index == 0x0F {
            // Explicit 24-bit frequency; ADTS needs an index
            return Err(HlsError::Codec(
                "explicit sampling frequency cannot be signalled in ADTS".into(),
            ));
        }
        let channel_configuration = reader.read_bits(4)? as u8;

        Ok(Self {
            profile: ProfileType::from(object_type - 1),
            sample_rate_index,
            channel_configuration,
        })
    }
}

/// Fixed + variable ADTS header, written without CRC (7 bytes).
#[derive(Debug)]
pub struct ADTSHeader {
    pub id: u8,                   // 1 bit, 0=MPEG-4, 1=MPEG-2
    pub protection_absent: bool,  // 1 bit
    pub profile: ProfileType,     // 2 bits
    pub sample_rate_index: u8,    // 4 bits
    pub channel_configuration: u8, // 3 bits
    pub frame_length: u16,        // 13 bits, header included
    pub buffer_fullness: u16,     // 11 bits
    pub number_of_raw_blocks: u8, // 2 bits
}

/// Size of an ADTS header without CRC.
pub const ADTS_HEADER_SIZE: usize = 7;

impl ADTSHeader {
    /// Header for one raw frame of `payload_len` bytes.
    pub fn for_frame(payload_len: usize, config: &AACConfig) -> Self {
        Self {
            id: 0,
            protection_absent: true,
            profile: config.profile,
            sample_rate_index: config.sample_rate_index,
            channel_configuration: config.channel_configuration,
            frame_length: (payload_len + ADTS_HEADER_SIZE) as u16,
            buffer_fullness: 0x7FF, // Variable bit rate
            number_of_raw_blocks: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; ADTS_HEADER_SIZE] {
        let mut writer = BitWriter::new();
        writer.write_bits(12, 0xFFF);
        writer.write_bits(1, self.id as u64);
        writer.write_bits(2, 0); // layer
        writer.write_flag(self.protection_absent);
        writer.write_bits(2, self.profile as u64);
        writer.write_bits(4, self.sample_rate_index as u64);
        writer.write_flag(false); // private
        writer.write_bits(3, self.channel_configuration as u64);
        writer.write_flag(false); // original/copy
        writer.write_flag(false); // home
        writer.write_flag(false); // copyright id bit
        writer.write_flag(false); // copyright id start
        writer.write_bits(13, self.frame_length as u64);
        writer.write_bits(11, self.buffer_fullness as u64);
        writer.write_bits(2, self.number_of_raw_blocks as u64);

        let mut out = [0u8; ADTS_HEADER_SIZE];
        out.copy_from_slice(&writer.into_bytes());
        out
    }
}
