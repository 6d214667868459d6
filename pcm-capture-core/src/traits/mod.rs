pub mod pcm_stream;
