use super::{error, Error};

impl Error {
    error!(KRB5_CC_BADNAME, -1765328245, "Credential cache name malformed");
    error!(KRB5_CC_UNKNOWN_TYPE, -1765328244, "Unknown credential cache type");
    error!(KRB5_FCC_NOFILE, -1765328189, "No credentials cache found");
    error!(
        KRB5_CCACHE_BADVNO,
        -1765328188, "Credentials cache file format version number unsupported"
    );
    error!(KRB5_CC_FORMAT, -1765328185, "Bad format in credentials cache");
}
