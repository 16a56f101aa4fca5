mod archive;
mod build;
