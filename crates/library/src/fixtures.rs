//! Hand-built audio fixtures for tests.

fn riff_chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + data.len() + 1);
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// Minimal PCM WAV (one second of silence at 8 kHz mono) with a RIFF INFO
/// list carrying a title and an artist.
pub(crate) fn wav_with_tags(title: &str, artist: &str) -> Vec<u8> {
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
    fmt.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
    fmt.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
    fmt.extend_from_slice(&2u16.to_le_bytes()); // block align
    fmt.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    let mut info = Vec::new();
    info.extend_from_slice(b"INFO");
    for (id, value) in [(*b"INAM", title), (*b"IART", artist)] {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        info.extend_from_slice(&riff_chunk(&id, &data));
    }

    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");
    body.extend_from_slice(&riff_chunk(b"fmt ", &fmt));
    body.extend_from_slice(&riff_chunk(b"data", &vec![0u8; 16000]));
    body.extend_from_slice(&riff_chunk(b"LIST", &info));

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}
