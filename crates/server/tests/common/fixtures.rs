//! Test data builders.

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Build a minimal but structurally real `.apk`: a gzip tar holding one
/// `.PKGINFO` entry.
pub fn apk_bytes(name: &str, version: &str) -> Bytes {
    apk_bytes_with_fields(name, version, &[])
}

/// Build an `.apk` with extra `.PKGINFO` key/value fields.
pub fn apk_bytes_with_fields(name: &str, version: &str, extra: &[(&str, &str)]) -> Bytes {
    let mut pkginfo = format!("pkgname = {name}\npkgver = {version}\n");
    for (key, value) in extra {
        pkginfo.push_str(&format!("{key} = {value}\n"));
    }

    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(pkginfo.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, ".PKGINFO", pkginfo.as_bytes())
        .unwrap();
    let tar_bytes = builder.into_inner().unwrap();

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&tar_bytes).unwrap();
    Bytes::from(gz.finish().unwrap())
}

/// Build an `.apk` whose data tar carries `payload_len` bytes that gzip
/// cannot shrink, so the artifact itself is at least that large on the wire.
pub fn apk_bytes_with_payload(name: &str, version: &str, payload_len: usize) -> Bytes {
    // xorshift64 keeps the payload incompressible without a rand dependency.
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    let mut payload = vec![0u8; payload_len];
    for chunk in payload.chunks_mut(8) {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        chunk.copy_from_slice(&state.to_le_bytes()[..chunk.len()]);
    }

    let pkginfo = format!("pkgname = {name}\npkgver = {version}\n");
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(pkginfo.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, ".PKGINFO", pkginfo.as_bytes())
        .unwrap();
    let mut header = tar::Header::new_gnu();
    header.set_size(payload.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "usr/share/blob.bin", payload.as_slice())
        .unwrap();
    let tar_bytes = builder.into_inner().unwrap();

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&tar_bytes).unwrap();
    Bytes::from(gz.finish().unwrap())
}

/// Build a multipart/form-data body with one `package` file field.
/// Returns (content_type, body).
pub fn multipart_package(file_name: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "pallet-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"package\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Read the APKINDEX text back out of a published signed index archive.
pub fn index_text(signed: &[u8]) -> String {
    use flate2::read::MultiGzDecoder;
    use std::io::Read;

    let mut archive = tar::Archive::new(MultiGzDecoder::new(signed));
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().as_ref() == std::path::Path::new("APKINDEX") {
            let mut text = String::new();
            entry.read_to_string(&mut text).unwrap();
            return text;
        }
    }
    panic!("no APKINDEX entry in archive");
}
