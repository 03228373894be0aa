mod clear;
mod present;
mod show;
mod tail;
