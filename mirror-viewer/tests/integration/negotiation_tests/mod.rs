mod test_bad_offer_recovers;
mod test_full_stream_cycle;
