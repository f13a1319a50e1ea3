//! FMOD sample bank (FSB5) demuxer.
//!
//! ```text
//! +--------------------+  "FSB5", version, counts, table sizes, codec,
//! | header             |  (v0: one extra u32), 32 bytes hash/padding
//! +--------------------+
//! | sample headers     |  packed u64 per sample + chained extra chunks
//! +--------------------+
//! | name table         |  u32 offsets then NUL-terminated names (optional)
//! +--------------------+
//! | sample data        |  payloads, addressed by 16-byte aligned offsets
//! +--------------------+
//! ```

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::errors::{Result, RigError};

const MAGIC: &[u8; 4] = b"FSB5";

const CHUNK_CHANNELS: u32 = 1;
const CHUNK_FREQUENCY: u32 = 2;
const CHUNK_LOOP: u32 = 3;
const CHUNK_VORBIS_DATA: u32 = 11;

fn frequency_from_id(id: u64) -> Option<u32> {
    Some(match id {
        1 => 8000,
        2 => 11000,
        3 => 11025,
        4 => 16000,
        5 => 22050,
        6 => 24000,
        7 => 32000,
        8 => 44100,
        9 => 48000,
        _ => return None,
    })
}

/// Codec of every sample in a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundFormat {
    None,
    Pcm8,
    Pcm16,
    Pcm24,
    Pcm32,
    PcmFloat,
    GcAdpcm,
    ImaAdpcm,
    Vag,
    HeVag,
    Xma,
    Mpeg,
    Celt,
    At9,
    Xwma,
    Vorbis,
}

impl SoundFormat {
    pub fn from_u32(mode: u32) -> Result<Self> {
        Ok(match mode {
            0 => Self::None,
            1 => Self::Pcm8,
            2 => Self::Pcm16,
            3 => Self::Pcm24,
            4 => Self::Pcm32,
            5 => Self::PcmFloat,
            6 => Self::GcAdpcm,
            7 => Self::ImaAdpcm,
            8 => Self::Vag,
            9 => Self::HeVag,
            10 => Self::Xma,
            11 => Self::Mpeg,
            12 => Self::Celt,
            13 => Self::At9,
            14 => Self::Xwma,
            15 => Self::Vorbis,
            other => {
                return Err(RigError::ContainerParse(format!("unknown FSB5 codec {other}")));
            }
        })
    }

    /// Canonical file extension of a rebuilt sample.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pcm8 | Self::Pcm16 | Self::Pcm24 | Self::Pcm32 | Self::PcmFloat => "wav",
            Self::Mpeg => "mp3",
            Self::Vorbis => "ogg",
            Self::Xma => "xma",
            Self::At9 => "at9",
            Self::GcAdpcm => "dsp",
            Self::Vag | Self::HeVag => "vag",
            _ => "bin",
        }
    }

    /// Bytes per PCM sample frame per channel.
    fn pcm_width(self) -> Option<u16> {
        match self {
            Self::Pcm8 => Some(1),
            Self::Pcm16 => Some(2),
            Self::Pcm24 => Some(3),
            Self::Pcm32 | Self::PcmFloat => Some(4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fsb5Header {
    pub version: u32,
    pub sample_count: u32,
    pub sample_headers_size: u32,
    pub name_table_size: u32,
    pub data_size: u32,
    pub mode: SoundFormat,
    /// Size of the fixed header, including the hash block.
    pub header_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleLoop {
    pub start: u32,
    pub end: u32,
}

/// One sample descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fsb5Sample {
    pub name: String,
    pub frequency: u32,
    pub channels: u16,
    /// Sample frames.
    pub samples: u32,
    #[serde(skip)]
    pub data: Range<usize>,
    pub looping: Option<SampleLoop>,
    pub vorbis_crc: Option<u32>,
}

/// A parsed bank borrowing the container bytes.
#[derive(Debug, Clone)]
pub struct Fsb5<'a> {
    pub header: Fsb5Header,
    pub samples: Vec<Fsb5Sample>,
    bytes: &'a [u8],
}

fn truncated(what: &str) -> impl FnOnce(std::io::Error) -> RigError + '_ {
    move |err| RigError::ContainerParse(format!("truncated FSB5 {what}: {err}"))
}

impl<'a> Fsb5<'a> {
    /// Parses header, sample descriptors and name table.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let header = parse_header(bytes)?;
        // Each descriptor is at least one u64; bound the count before allocating.
        let descriptor_room = (bytes.len() - header.header_size as usize) / 8;
        if header.sample_count as usize > descriptor_room {
            return Err(RigError::ContainerParse(format!(
                "FSB5 declares {} samples, container has room for {descriptor_room}",
                header.sample_count
            )));
        }
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(u64::from(header.header_size));

        let mut descriptors = Vec::with_capacity(header.sample_count as usize);
        for index in 0..header.sample_count {
            descriptors.push(parse_descriptor(&mut cursor, index)?);
        }

        let names = if header.name_table_size > 0 {
            parse_names(bytes, &header)?
        } else {
            (0..header.sample_count).map(|i| format!("{i:04}")).collect()
        };

        let data_start = header.header_size as usize
            + header.sample_headers_size as usize
            + header.name_table_size as usize;
        let data_end = data_start + header.data_size as usize;
        if data_end > bytes.len() {
            return Err(RigError::ContainerParse(format!(
                "FSB5 data section ends at {data_end}, container holds {} bytes",
                bytes.len()
            )));
        }

        let mut samples = Vec::with_capacity(descriptors.len());
        for (index, (raw, name)) in descriptors.iter().zip(names).enumerate() {
            let end = descriptors
                .get(index + 1)
                .map_or(header.data_size as usize, |next| next.data_offset);
            if raw.data_offset > end || end > header.data_size as usize {
                return Err(RigError::ContainerParse(format!(
                    "sample {index} data range {}..{end} outside data section of {} bytes",
                    raw.data_offset, header.data_size
                )));
            }
            samples.push(Fsb5Sample {
                name,
                frequency: raw.frequency,
                channels: raw.channels,
                samples: raw.samples,
                data: data_start + raw.data_offset..data_start + end,
                looping: raw.looping.clone(),
                vorbis_crc: raw.vorbis_crc,
            });
        }

        Ok(Self {
            header,
            samples,
            bytes,
        })
    }

    /// Raw payload of `sample`.
    #[must_use]
    pub fn sample_data(&self, sample: &Fsb5Sample) -> &'a [u8] {
        &self.bytes[sample.data.clone()]
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.header.mode.extension()
    }

    /// Rebuilds `sample` into a standalone file body.
    pub fn rebuild(&self, sample: &Fsb5Sample) -> Result<Vec<u8>> {
        let data = self.sample_data(sample);
        match self.header.mode {
            SoundFormat::Mpeg => Ok(data.to_vec()),
            mode => match mode.pcm_width() {
                Some(width) => write_wav(sample, width, mode == SoundFormat::PcmFloat, data),
                None => Err(RigError::UnsupportedCodec(format!(
                    "cannot rebuild {mode:?} sample '{}'",
                    sample.name
                ))),
            },
        }
    }
}

fn parse_header(bytes: &[u8]) -> Result<Fsb5Header> {
    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated("header"))?;
    if &magic != MAGIC {
        return Err(RigError::ContainerParse(format!(
            "bad FSB5 magic {magic:02x?}"
        )));
    }

    let mut next = || cursor.read_u32::<LittleEndian>().map_err(truncated("header"));
    let version = next()?;
    let sample_count = next()?;
    let sample_headers_size = next()?;
    let name_table_size = next()?;
    let data_size = next()?;
    let mode = SoundFormat::from_u32(next()?)?;

    let header_size = match version {
        0 => 0x40,
        1 => 0x3C,
        other => {
            return Err(RigError::ContainerParse(format!(
                "unsupported FSB5 version {other}"
            )));
        }
    };
    if bytes.len() < header_size as usize {
        return Err(RigError::ContainerParse(format!(
            "FSB5 header needs {header_size} bytes, container holds {}",
            bytes.len()
        )));
    }

    Ok(Fsb5Header {
        version,
        sample_count,
        sample_headers_size,
        name_table_size,
        data_size,
        mode,
        header_size,
    })
}

struct RawDescriptor {
    frequency: u32,
    channels: u16,
    samples: u32,
    data_offset: usize,
    looping: Option<SampleLoop>,
    vorbis_crc: Option<u32>,
}

fn parse_descriptor(cursor: &mut Cursor<&[u8]>, index: u32) -> Result<RawDescriptor> {
    let raw = cursor
        .read_u64::<LittleEndian>()
        .map_err(truncated("sample header"))?;

    let mut next_chunk = raw & 1 == 1;
    let frequency_id = (raw >> 1) & 0xF;
    let mut channels = (((raw >> 5) & 1) + 1) as u16;
    let data_offset = (((raw >> 6) & 0x0FFF_FFFF) * 16) as usize;
    let samples = ((raw >> 34) & 0x3FFF_FFFF) as u32;

    let mut frequency = frequency_from_id(frequency_id);
    let mut looping = None;
    let mut vorbis_crc = None;

    while next_chunk {
        let chunk = cursor
            .read_u32::<LittleEndian>()
            .map_err(truncated("sample chunk"))?;
        next_chunk = chunk & 1 == 1;
        let size = u64::from((chunk >> 1) & 0x00FF_FFFF);
        let kind = (chunk >> 25) & 0x7F;
        let start = cursor.position();

        match kind {
            CHUNK_CHANNELS => {
                channels = u16::from(cursor.read_u8().map_err(truncated("channel chunk"))?);
            }
            CHUNK_FREQUENCY => {
                frequency = Some(
                    cursor
                        .read_u32::<LittleEndian>()
                        .map_err(truncated("frequency chunk"))?,
                );
            }
            CHUNK_LOOP => {
                let start = cursor.read_u32::<LittleEndian>().map_err(truncated("loop chunk"))?;
                let end = cursor.read_u32::<LittleEndian>().map_err(truncated("loop chunk"))?;
                looping = Some(SampleLoop { start, end });
            }
            CHUNK_VORBIS_DATA => {
                vorbis_crc = Some(
                    cursor
                        .read_u32::<LittleEndian>()
                        .map_err(truncated("vorbis chunk"))?,
                );
            }
            _ => {}
        }

        if start + size > cursor.get_ref().len() as u64 {
            return Err(RigError::ContainerParse(format!(
                "sample {index} chunk of {size} bytes runs past the container"
            )));
        }
        cursor
            .seek(SeekFrom::Start(start + size))
            .map_err(truncated("sample chunk"))?;
    }

    let frequency = frequency.ok_or_else(|| {
        RigError::ContainerParse(format!(
            "sample {index} has unknown frequency id {frequency_id}"
        ))
    })?;

    Ok(RawDescriptor {
        frequency,
        channels,
        samples,
        data_offset,
        looping,
        vorbis_crc,
    })
}

fn parse_names(bytes: &[u8], header: &Fsb5Header) -> Result<Vec<String>> {
    let table_start = header.header_size as usize + header.sample_headers_size as usize;
    let table_end = table_start + header.name_table_size as usize;
    let table = bytes.get(table_start..table_end).ok_or_else(|| {
        RigError::ContainerParse("FSB5 name table runs past the container".into())
    })?;

    let mut offsets = Cursor::new(table);
    (0..header.sample_count)
        .map(|index| {
            let offset = offsets
                .read_u32::<LittleEndian>()
                .map_err(truncated("name table"))? as usize;
            let tail = table.get(offset..).ok_or_else(|| {
                RigError::ContainerParse(format!("name offset {offset} of sample {index} out of range"))
            })?;
            let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
            Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
        })
        .collect()
}

/// RIFF/WAVE body around raw PCM frames.
fn write_wav(sample: &Fsb5Sample, width: u16, float: bool, data: &[u8]) -> Result<Vec<u8>> {
    let data_len = u32::try_from(data.len())
        .map_err(|_| RigError::ContainerParse(format!("sample '{}' too large", sample.name)))?;
    let pad = data.len() % 2;
    let overflow = || {
        RigError::ContainerParse(format!(
            "sample '{}' WAV header fields overflow",
            sample.name
        ))
    };
    let block_align = sample.channels.checked_mul(width).ok_or_else(overflow)?;
    let byte_rate = sample
        .frequency
        .checked_mul(u32::from(block_align))
        .ok_or_else(overflow)?;
    let riff_len = data_len
        .checked_add(36 + pad as u32)
        .ok_or_else(overflow)?;

    let mut out = Vec::with_capacity(44 + data.len() + pad);
    out.extend_from_slice(b"RIFF");
    out.write_u32::<LittleEndian>(riff_len)?;
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.write_u32::<LittleEndian>(16)?;
    out.write_u16::<LittleEndian>(if float { 3 } else { 1 })?;
    out.write_u16::<LittleEndian>(sample.channels)?;
    out.write_u32::<LittleEndian>(sample.frequency)?;
    out.write_u32::<LittleEndian>(byte_rate)?;
    out.write_u16::<LittleEndian>(block_align)?;
    out.write_u16::<LittleEndian>(width * 8)?;
    out.extend_from_slice(b"data");
    out.write_u32::<LittleEndian>(data_len)?;
    out.extend_from_slice(data);
    if pad == 1 {
        out.push(0);
    }
    Ok(out)
}
