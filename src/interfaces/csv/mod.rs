pub mod room_reader;
