use std::fmt;

use hifitime::Epoch;
use nom::{
    number::complete::{le_f64, le_i32},
    IResult,
};

use super::naif_ids::NaifIds;

/// SPK segment types handled by the reader.
pub(crate) const SPK_CHEBYSHEV_POSITION: i32 = 2;

/// Array summary (segment descriptor) of an SPK kernel.
///
/// Epochs are ET seconds past J2000, addresses are 1-based double-precision word indices.
#[derive(Debug, PartialEq, Clone)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: i32,
    pub center: i32,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, start_epoch) = le_f64(input)?;
        let (input, end_epoch) = le_f64(input)?;

        let (input, target) = le_i32(input)?;
        let (input, center) = le_i32(input)?;
        let (input, frame_id) = le_i32(input)?;
        let (input, data_type) = le_i32(input)?;
        let (input, initial_addr) = le_i32(input)?;
        let (input, final_addr) = le_i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    /// True when the ET epoch lies inside the segment time span.
    pub fn covers(&self, et_seconds: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&et_seconds)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = |id: i32| {
            NaifIds::from_id(id)
                .map(|naif| naif.to_string())
                .unwrap_or_else(|_| format!("NAIF {id}"))
        };

        write!(
            f,
            "{} wrt {} [{} .. {}] type {} frame {} addr {}..{}",
            body(self.target),
            body(self.center),
            Epoch::from_et_seconds(self.start_epoch),
            Epoch::from_et_seconds(self.end_epoch),
            self.data_type,
            self.frame_id,
            self.initial_addr,
            self.final_addr
        )
    }
}

#[cfg(test)]
mod test_summary {
    use super::*;

    #[test]
    fn test_summary_parse_and_display() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-14200747200.0f64).to_le_bytes());
        bytes.extend_from_slice(&20514081600.0f64.to_le_bytes());
        for value in [3i32, 0, 1, 2, 3021513, 4051108] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let (rest, summary) = Summary::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            summary,
            Summary {
                start_epoch: -14200747200.0,
                end_epoch: 20514081600.0,
                target: 3,
                center: 0,
                frame_id: 1,
                data_type: SPK_CHEBYSHEV_POSITION,
                initial_addr: 3021513,
                final_addr: 4051108,
            }
        );
        assert!(summary.covers(0.0));
        assert!(!summary.covers(3e10));

        assert_eq!(
            summary.to_string(),
            "EarthMoonBarycenter wrt Solar System Barycenter \
             [1549-12-31T00:00:00 ET .. 2650-01-25T00:00:00 ET] type 2 frame 1 addr 3021513..4051108"
        );
    }
}
