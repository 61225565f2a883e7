//! # Pose recording module
//!
//! Records sequences of arm poses to a byte-addressed page device so they
//! can be played back later. The device abstraction matches EEPROM-style
//! parts: reads and writes must not cross a page boundary, the store splits
//! spanning accesses into per-page chunks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::JointAngles;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of a device page. Single accesses must stay within one page.
pub const PAGE_SIZE: usize = 128;

/// Highest address the recorder will touch, leaving headroom for the end
/// marker at the top of a 64 KiB device.
pub const MAX_ADDR: u16 = 65530;

/// Bytes per recorded pose frame.
const FRAME_LEN: usize = 5;

/// Marker byte written after the last frame.
const END_FLAG: u8 = 0xFF;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum RecordingError {
    #[error("Access at address {0} runs past the end of the device")]
    OutOfBounds(u16),

    #[error("Recording is full")]
    Full,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A byte-addressed device accessed one page at a time.
pub trait PageDevice {
    /// Read bytes starting at `addr`. The access is guaranteed by the caller
    /// to stay within a single page.
    fn read_within_page(&self, addr: u16, buf: &mut [u8]) -> Result<(), RecordingError>;

    /// Write bytes starting at `addr`. The access is guaranteed by the
    /// caller to stay within a single page.
    fn write_within_page(&mut self, addr: u16, data: &[u8]) -> Result<(), RecordingError>;
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Wraps a [`PageDevice`] with arbitrary-length accesses, splitting them at
/// page boundaries.
pub struct PageStore<D: PageDevice> {
    dev: D,
}

/// In-memory simulation of a 64 KiB page device.
pub struct MemDevice {
    mem: Vec<u8>,
}

/// A single recorded pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseFrame {
    /// Servo angles in (base, shoulder, elbow, hand) order, whole degrees.
    pub angles_deg: [u8; 4],

    /// True if the gripper was closed at this pose.
    pub gripper_closed: bool,
}

/// Records pose frames sequentially to a page device and plays them back.
pub struct PoseRecorder<D: PageDevice> {
    store: PageStore<D>,

    /// Next address to record to or play from.
    addr: u16,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D: PageDevice> PageStore<D> {
    pub fn new(dev: D) -> Self {
        Self { dev }
    }

    /// Read `buf.len()` bytes starting at `addr`, splitting the access at
    /// page boundaries.
    pub fn read(&self, addr: u16, buf: &mut [u8]) -> Result<(), RecordingError> {
        let addr = addr as usize;
        let mut offset = 0;

        while offset < buf.len() {
            let page_remaining = PAGE_SIZE - (addr + offset) % PAGE_SIZE;
            let chunk_len = (buf.len() - offset).min(page_remaining);

            self.dev.read_within_page(
                (addr + offset) as u16,
                &mut buf[offset..offset + chunk_len],
            )?;

            offset += chunk_len;
        }

        Ok(())
    }

    /// Write `data` starting at `addr`, splitting the access at page
    /// boundaries.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), RecordingError> {
        let addr = addr as usize;
        let mut offset = 0;

        while offset < data.len() {
            let page_remaining = PAGE_SIZE - (addr + offset) % PAGE_SIZE;
            let chunk_len = (data.len() - offset).min(page_remaining);

            self.dev
                .write_within_page((addr + offset) as u16, &data[offset..offset + chunk_len])?;

            offset += chunk_len;
        }

        Ok(())
    }
}

impl Default for MemDevice {
    fn default() -> Self {
        Self {
            mem: vec![0u8; 1 << 16],
        }
    }
}

impl PageDevice for MemDevice {
    fn read_within_page(&self, addr: u16, buf: &mut [u8]) -> Result<(), RecordingError> {
        let addr = addr as usize;

        match self.mem.get(addr..addr + buf.len()) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(RecordingError::OutOfBounds(addr as u16)),
        }
    }

    fn write_within_page(&mut self, addr: u16, data: &[u8]) -> Result<(), RecordingError> {
        let addr = addr as usize;

        match self.mem.get_mut(addr..addr + data.len()) {
            Some(bytes) => {
                bytes.copy_from_slice(data);
                Ok(())
            }
            None => Err(RecordingError::OutOfBounds(addr as u16)),
        }
    }
}

impl PoseFrame {
    /// Build a frame from measured joint angles and the hand angle.
    ///
    /// Angles are stored as whole degrees clamped to `[0, 180]`, matching
    /// the servo range, so the end marker byte can never appear in a frame.
    pub fn from_angles(angles: &JointAngles, hand_deg: f64, gripper_closed: bool) -> Self {
        let quantise = |a: f64| util::maths::clamp(&a, &0.0, &180.0).round() as u8;

        Self {
            angles_deg: [
                quantise(angles.base_deg),
                quantise(angles.shoulder_deg),
                quantise(angles.elbow_deg),
                quantise(hand_deg),
            ],
            gripper_closed,
        }
    }

    fn to_bytes(self) -> [u8; FRAME_LEN] {
        [
            self.angles_deg[0],
            self.angles_deg[1],
            self.angles_deg[2],
            self.angles_deg[3],
            self.gripper_closed as u8,
        ]
    }

    fn from_bytes(bytes: &[u8; FRAME_LEN]) -> Self {
        Self {
            angles_deg: [bytes[0], bytes[1], bytes[2], bytes[3]],
            gripper_closed: bytes[4] != 0,
        }
    }
}

impl<D: PageDevice> PoseRecorder<D> {
    pub fn new(dev: D) -> Self {
        Self {
            store: PageStore::new(dev),
            addr: 0,
        }
    }

    /// Append a frame to the recording.
    pub fn record(&mut self, frame: &PoseFrame) -> Result<(), RecordingError> {
        if self.addr as usize + FRAME_LEN > MAX_ADDR as usize {
            return Err(RecordingError::Full);
        }

        self.store.write(self.addr, &frame.to_bytes())?;
        self.addr += FRAME_LEN as u16;

        Ok(())
    }

    /// Terminate the recording with the end marker.
    pub fn finish(&mut self) -> Result<(), RecordingError> {
        self.store.write(self.addr, &[END_FLAG])
    }

    /// Reset to the start of the recording, for playback or re-recording.
    pub fn rewind(&mut self) {
        self.addr = 0;
    }

    /// Read the next recorded frame, `None` once the end marker is reached.
    pub fn next_frame(&mut self) -> Result<Option<PoseFrame>, RecordingError> {
        let mut marker = [0u8; 1];
        self.store.read(self.addr, &mut marker)?;

        if marker[0] == END_FLAG {
            return Ok(None);
        }

        let mut bytes = [0u8; FRAME_LEN];
        self.store.read(self.addr, &mut bytes)?;
        self.addr += FRAME_LEN as u16;

        Ok(Some(PoseFrame::from_bytes(&bytes)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_split_write() {
        let mut store = PageStore::new(MemDevice::default());

        // Five bytes written at 126 must land as 2 bytes in the first page
        // and 3 in the second
        store.write(126, &[1, 2, 3, 4, 5]).unwrap();

        let mut buf = [0u8; 5];
        store.read(126, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5]);

        // Verify the split landed where expected through raw page reads
        let mut first = [0u8; 2];
        store.dev.read_within_page(126, &mut first).unwrap();
        assert_eq!(first, [1, 2]);

        let mut second = [0u8; 3];
        store.dev.read_within_page(128, &mut second).unwrap();
        assert_eq!(second, [3, 4, 5]);
    }

    #[test]
    fn test_record_playback_round_trip() {
        let mut recorder = PoseRecorder::new(MemDevice::default());

        let frames = [
            PoseFrame {
                angles_deg: [90, 60, 30, 45],
                gripper_closed: false,
            },
            PoseFrame {
                angles_deg: [95, 58, 32, 45],
                gripper_closed: true,
            },
        ];

        for frame in frames.iter() {
            recorder.record(frame).unwrap();
        }
        recorder.finish().unwrap();

        recorder.rewind();
        assert_eq!(recorder.next_frame().unwrap(), Some(frames[0]));
        assert_eq!(recorder.next_frame().unwrap(), Some(frames[1]));
        assert_eq!(recorder.next_frame().unwrap(), None);
    }

    #[test]
    fn test_frame_quantisation() {
        let angles = JointAngles::new(90.4, -5.0, 200.0);
        let frame = PoseFrame::from_angles(&angles, 45.5, false);

        // Clamped into the servo range and rounded to whole degrees
        assert_eq!(frame.angles_deg, [90, 0, 180, 46]);
    }

    #[test]
    fn test_recorder_full() {
        let mut recorder = PoseRecorder::new(MemDevice::default());
        recorder.addr = MAX_ADDR - 2;

        let frame = PoseFrame {
            angles_deg: [90, 60, 30, 45],
            gripper_closed: false,
        };

        assert!(matches!(
            recorder.record(&frame),
            Err(RecordingError::Full)
        ));
    }
}
