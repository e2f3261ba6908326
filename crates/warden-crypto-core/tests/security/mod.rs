mod entropy_quality;
mod log_hygiene;
