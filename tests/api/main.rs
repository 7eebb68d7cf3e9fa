mod waitlist;
