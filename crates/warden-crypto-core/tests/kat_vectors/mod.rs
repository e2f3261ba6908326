mod hmac_sha256;
mod password_record;
mod pbkdf2_sha256;
