use std::fmt;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::JunctionError;

pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;

// AES-256 key owned by exactly one session.
// Not `Clone`, so the only copy lives in its session. Zeroed by
// zero_key at disconnect and again on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
	#[cfg(test)]
	pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
		SessionKey(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
		&self.0
	}

	#[cfg(test)]
	pub(crate) fn is_zeroed(&self) -> bool {
		self.0.iter().all(|b| *b == 0)
	}
}

impl fmt::Debug for SessionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SessionKey([REDACTED])")
	}
}

// Output of one seal: ciphertext, the nonce it was sealed under and the
// detached GCM tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
	pub ciphertext: Vec<u8>,
	pub iv: [u8; NONCE_LEN],
	pub auth_tag: [u8; TAG_LEN],
}

// AES-256-GCM with a fresh random 96-bit nonce per seal.
pub struct Encryptor {
	secure_random: SystemRandom,
}

impl Default for Encryptor {
	fn default() -> Self {
		Self::new()
	}
}

impl Encryptor {
	pub fn new() -> Self {
		Encryptor {
			secure_random: SystemRandom::new(),
		}
	}

	pub fn generate_key(&self) -> Result<SessionKey, JunctionError> {
		let mut key = [0u8; KEY_LEN];
		self.secure_random.fill(&mut key)?;
		let session_key = SessionKey(key);
		key.zeroize();
		Ok(session_key)
	}

	pub fn encrypt(&self, plaintext: &str, key: &SessionKey) -> Result<Sealed, JunctionError> {
		let mut iv = [0u8; NONCE_LEN];
		self.secure_random.fill(&mut iv)?;

		let sealing_key = less_safe_key(key).ok_or(JunctionError::Encryption)?;
		let mut in_out = plaintext.as_bytes().to_vec();

		let tag = sealing_key
			.seal_in_place_separate_tag(
				Nonce::assume_unique_for_key(iv),
				Aad::empty(),
				&mut in_out,
			)
			.map_err(|_| JunctionError::Encryption)?;
		let auth_tag =
			<[u8; TAG_LEN]>::try_from(tag.as_ref()).map_err(|_| JunctionError::Encryption)?;

		Ok(Sealed {
			ciphertext: in_out,
			iv,
			auth_tag,
		})
	}

	// Open a sealed payload. Any tag mismatch, malformed nonce or tag, or
	// non-UTF-8 plaintext is a JunctionError::AuthenticationFailure;
	// no partial plaintext is ever returned.
	pub fn decrypt(
		&self,
		ciphertext: &[u8],
		iv: &[u8],
		auth_tag: &[u8],
		key: &SessionKey,
	) -> Result<String, JunctionError> {
		if auth_tag.len() != AES_256_GCM.tag_len() {
			return Err(JunctionError::AuthenticationFailure);
		}
		let nonce =
			Nonce::try_assume_unique_for_key(iv).map_err(|_| JunctionError::AuthenticationFailure)?;
		let opening_key = less_safe_key(key).ok_or(JunctionError::AuthenticationFailure)?;

		let mut in_out = Zeroizing::new(Vec::with_capacity(ciphertext.len() + auth_tag.len()));
		in_out.extend_from_slice(ciphertext);
		in_out.extend_from_slice(auth_tag);

		let plaintext = opening_key
			.open_in_place(nonce, Aad::empty(), &mut in_out)
			.map_err(|_| JunctionError::AuthenticationFailure)?;

		String::from_utf8(plaintext.to_vec()).map_err(|_| JunctionError::AuthenticationFailure)
	}

	pub fn open(&self, sealed: &Sealed, key: &SessionKey) -> Result<String, JunctionError> {
		self.decrypt(&sealed.ciphertext, &sealed.iv, &sealed.auth_tag, key)
	}
}

// Overwrite the key with zeros in place.
// Best effort only: copies made before this call (by the allocator,
// by the cipher's expanded key schedule, or by swapping) are not reached.
pub fn zero_key(key: &mut SessionKey) {
	key.zeroize();
}

fn less_safe_key(key: &SessionKey) -> Option<LessSafeKey> {
	UnboundKey::new(&AES_256_GCM, key.as_bytes())
		.ok()
		.map(LessSafeKey::new)
}
